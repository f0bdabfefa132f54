//! Optimizer trait and the default update strategy

use crate::train::Loss;

/// Optimization backend driven by the default update strategy
///
/// The optimizer owns (or references) the parameters it updates; the trainer
/// never looks at parameters directly.
pub trait Optimizer {
    /// Clear accumulated gradients
    fn zero_grad(&mut self);

    /// Apply one optimization step from the current gradients
    fn step(&mut self);
}

/// Default update: clear gradients, backpropagate, step
pub fn default_update<O: Optimizer, L: Loss>(optimizer: &mut O, loss: &L) {
    optimizer.zero_grad();
    loss.backward();
    optimizer.step();
}
