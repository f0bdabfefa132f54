//! Forward-pass interface

use ndarray::ArrayD;

use crate::train::batch::Inputs;

/// Maps batch inputs to predictions
///
/// Implemented for every `FnMut(&Inputs) -> ArrayD<f32>`, so a closure over a
/// shared model is enough:
///
/// ```
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use ndarray::ArrayD;
/// use ensayo::train::{Forward, Inputs};
///
/// let scale = Rc::new(RefCell::new(2.0f32));
/// let shared = Rc::clone(&scale);
/// let mut model = move |xs: &Inputs| -> ArrayD<f32> {
///     let factor = *shared.borrow();
///     xs.columns()[0].mapv(|v| v * factor)
/// };
///
/// let xs = Inputs::Single(ndarray::arr1(&[1.0, 2.0]).into_dyn());
/// assert_eq!(model.forward(&xs).iter().copied().collect::<Vec<_>>(), vec![2.0, 4.0]);
/// ```
pub trait Forward {
    /// Predictions for `xs`
    fn forward(&mut self, xs: &Inputs) -> ArrayD<f32>;
}

impl<F> Forward for F
where
    F: FnMut(&Inputs) -> ArrayD<f32>,
{
    fn forward(&mut self, xs: &Inputs) -> ArrayD<f32> {
        self(xs)
    }
}
