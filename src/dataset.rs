//! Columnar in-memory dataset with mini-batch iteration
//!
//! A [`Dataset`] is a list of columns sharing their first axis (the sample
//! axis). Batching yields every column restricted to the same sample indices,
//! optionally in a shuffled order.

use ndarray::{ArrayD, Axis};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::{Error, Result};

/// Column-oriented dataset
#[derive(Debug, Clone)]
pub struct Dataset {
    columns: Vec<ArrayD<f32>>,
    size: usize,
}

impl Dataset {
    /// Create a dataset from columns that share the sample axis
    pub fn new(columns: Vec<ArrayD<f32>>) -> Result<Self> {
        let Some(first) = columns.first() else {
            return Err(Error::MissingColumns { required: 1, found: 0 });
        };
        if let Some(column) = columns.iter().position(|array| array.ndim() == 0) {
            return Err(Error::ScalarColumn { column });
        }
        let size = first.len_of(Axis(0));
        for (column, array) in columns.iter().enumerate().skip(1) {
            let found = array.len_of(Axis(0));
            if found != size {
                return Err(Error::ColumnLength { column, expected: size, found });
            }
        }
        Ok(Self { columns, size })
    }

    /// Create a two-column `(x, y)` dataset
    pub fn from_xy(x: ArrayD<f32>, y: ArrayD<f32>) -> Result<Self> {
        Self::new(vec![x, y])
    }

    /// Number of samples
    pub fn size(&self) -> usize {
        self.size
    }

    /// Whether the dataset has no samples
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Number of columns
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Borrow the columns
    pub fn columns(&self) -> &[ArrayD<f32>] {
        &self.columns
    }

    /// Number of batches for a given batch size (the last one may be partial)
    pub fn num_batches(&self, batch_size: usize) -> usize {
        if batch_size == 0 {
            return 0;
        }
        self.size.div_ceil(batch_size)
    }

    /// Iterate column-wise batches
    ///
    /// The sample order is drawn from `rng` once, up front, when `shuffle`
    /// is set; otherwise samples come out in storage order.
    pub fn batches<R: Rng + ?Sized>(
        &self,
        batch_size: usize,
        shuffle: bool,
        rng: &mut R,
    ) -> Result<Batches<'_>> {
        if batch_size == 0 {
            return Err(Error::InvalidBatchSize);
        }
        let mut order: Vec<usize> = (0..self.size).collect();
        if shuffle {
            order.shuffle(rng);
        }
        Ok(Batches { dataset: self, order, batch_size, position: 0 })
    }
}

/// Iterator over column-wise batches of a [`Dataset`]
pub struct Batches<'a> {
    dataset: &'a Dataset,
    order: Vec<usize>,
    batch_size: usize,
    position: usize,
}

impl Iterator for Batches<'_> {
    type Item = Vec<ArrayD<f32>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.position >= self.order.len() {
            return None;
        }
        let end = (self.position + self.batch_size).min(self.order.len());
        let indices = &self.order[self.position..end];
        self.position = end;
        Some(
            self.dataset
                .columns
                .iter()
                .map(|column| column.select(Axis(0), indices))
                .collect(),
        )
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.order.len() - self.position;
        let batches = remaining.div_ceil(self.batch_size);
        (batches, Some(batches))
    }
}

impl ExactSizeIterator for Batches<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, arr2};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn toy() -> Dataset {
        let x = arr2(&[[0.0, 0.0], [1.0, 1.0], [2.0, 2.0], [3.0, 3.0], [4.0, 4.0]]).into_dyn();
        let y = arr1(&[0.0, 1.0, 2.0, 3.0, 4.0]).into_dyn();
        Dataset::from_xy(x, y).unwrap()
    }

    #[test]
    fn test_dataset_size_and_columns() {
        let ds = toy();
        assert_eq!(ds.size(), 5);
        assert_eq!(ds.num_columns(), 2);
        assert!(!ds.is_empty());
    }

    #[test]
    fn test_dataset_rejects_no_columns() {
        let err = Dataset::new(vec![]).unwrap_err();
        assert!(matches!(err, Error::MissingColumns { required: 1, found: 0 }));
    }

    #[test]
    fn test_dataset_rejects_mismatched_lengths() {
        let x = arr1(&[1.0, 2.0, 3.0]).into_dyn();
        let y = arr1(&[1.0, 2.0]).into_dyn();
        let err = Dataset::from_xy(x, y).unwrap_err();
        assert!(matches!(err, Error::ColumnLength { column: 1, expected: 3, found: 2 }));
    }

    #[test]
    fn test_dataset_rejects_scalar_columns() {
        let scalar = ArrayD::from_elem(vec![], 1.0);
        let err = Dataset::from_xy(scalar.clone(), scalar).unwrap_err();
        assert!(matches!(err, Error::ScalarColumn { column: 0 }));

        let err = Dataset::from_xy(arr1(&[1.0, 2.0]).into_dyn(), ArrayD::from_elem(vec![], 1.0))
            .unwrap_err();
        assert!(matches!(err, Error::ScalarColumn { column: 1 }));
    }

    #[test]
    fn test_num_batches_rounds_up() {
        let ds = toy();
        assert_eq!(ds.num_batches(2), 3);
        assert_eq!(ds.num_batches(5), 1);
        assert_eq!(ds.num_batches(10), 1);
        assert_eq!(ds.num_batches(0), 0);
    }

    #[test]
    fn test_batches_in_order_with_partial_tail() {
        let ds = toy();
        let mut rng = StdRng::seed_from_u64(0);
        let batches: Vec<_> = ds.batches(2, false, &mut rng).unwrap().collect();
        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0][1], arr1(&[0.0, 1.0]).into_dyn());
        assert_eq!(batches[2][1], arr1(&[4.0]).into_dyn());
        assert_eq!(batches[2][0].shape(), &[1, 2]);
    }

    #[test]
    fn test_batches_shuffled_is_permutation() {
        let ds = toy();
        let mut rng = StdRng::seed_from_u64(7);
        let mut seen: Vec<f32> = ds
            .batches(2, true, &mut rng)
            .unwrap()
            .flat_map(|batch| batch[1].iter().copied().collect::<Vec<_>>())
            .collect();
        seen.sort_by(f32::total_cmp);
        assert_eq!(seen, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_batches_keep_rows_aligned() {
        let ds = toy();
        let mut rng = StdRng::seed_from_u64(3);
        for batch in ds.batches(2, true, &mut rng).unwrap() {
            for (row, target) in batch[0].outer_iter().zip(batch[1].iter()) {
                assert_eq!(row.iter().next(), Some(target));
            }
        }
    }

    #[test]
    fn test_batches_zero_size_rejected() {
        let ds = toy();
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(ds.batches(0, false, &mut rng), Err(Error::InvalidBatchSize)));
    }

    #[test]
    fn test_batches_size_hint() {
        let ds = toy();
        let mut rng = StdRng::seed_from_u64(0);
        let mut it = ds.batches(2, false, &mut rng).unwrap();
        assert_eq!(it.len(), 3);
        it.next();
        assert_eq!(it.len(), 2);
    }
}
