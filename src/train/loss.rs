//! Loss value trait
//!
//! A loss function is any `Fn(&ys, &ts) -> L`. The trainer only needs the
//! scalar value of `L` for bookkeeping and, for the default update strategy,
//! a way to backpropagate from it.

/// Scalar loss produced by a loss function
pub trait Loss {
    /// Scalar value accumulated into the epoch loss
    fn value(&self) -> f32;

    /// Backpropagate from this loss
    ///
    /// Backends without autodiff keep the default no-op.
    fn backward(&self) {}
}

impl Loss for f32 {
    fn value(&self) -> f32 {
        *self
    }
}

impl Loss for f64 {
    fn value(&self) -> f32 {
        *self as f32
    }
}
