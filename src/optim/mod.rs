//! Optimizer interface
//!
//! The concrete optimization algorithm lives outside this crate. The trainer
//! drives it through [`Optimizer`] via the replaceable update strategy.

mod optimizer;

pub use optimizer::{default_update, Optimizer};
