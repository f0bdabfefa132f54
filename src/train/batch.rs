//! Batch data structure

use ndarray::{ArrayD, Axis};

use crate::error::{Error, Result};

/// Model inputs of one batch
///
/// A batch whose dataset has a single input column carries that column
/// directly; otherwise every input column is kept in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Inputs {
    /// Exactly one input column
    Single(ArrayD<f32>),
    /// Two or more input columns
    Multi(Vec<ArrayD<f32>>),
}

impl Inputs {
    /// The unwrapped column, when there is only one
    pub fn single(&self) -> Option<&ArrayD<f32>> {
        match self {
            Inputs::Single(x) => Some(x),
            Inputs::Multi(_) => None,
        }
    }

    /// All input columns
    pub fn columns(&self) -> Vec<&ArrayD<f32>> {
        match self {
            Inputs::Single(x) => vec![x],
            Inputs::Multi(xs) => xs.iter().collect(),
        }
    }

    /// Number of input columns
    pub fn num_columns(&self) -> usize {
        match self {
            Inputs::Single(_) => 1,
            Inputs::Multi(xs) => xs.len(),
        }
    }
}

/// A training batch containing inputs and targets
#[derive(Debug, Clone)]
pub struct Batch {
    /// Input features
    pub inputs: Inputs,
    /// Target labels/values
    pub targets: ArrayD<f32>,
}

impl Batch {
    /// Create a new batch
    pub fn new(inputs: Inputs, targets: ArrayD<f32>) -> Self {
        Self { inputs, targets }
    }

    /// Split dataset columns into inputs (all but last) and targets (last)
    pub fn from_columns(mut columns: Vec<ArrayD<f32>>) -> Result<Self> {
        if columns.len() < 2 {
            return Err(Error::MissingColumns { required: 2, found: columns.len() });
        }
        let targets = columns.pop().ok_or(Error::MissingColumns { required: 2, found: 0 })?;
        let inputs = if columns.len() == 1 {
            Inputs::Single(columns.remove(0))
        } else {
            Inputs::Multi(columns)
        };
        Ok(Self { inputs, targets })
    }

    /// Get batch size (samples in the target column)
    pub fn size(&self) -> usize {
        self.targets.len_of(Axis(0))
    }
}
