//! Trainer abstraction for training loops
//!
//! This module provides a high-level `Trainer` that orchestrates the training loop,
//! including:
//! - Per-phase batch processing (`process`)
//! - Multi-epoch training with optional validation (`fit`, `fit_dataset`)
//! - Pluggable update strategy, hooks and callbacks (`configure`)
//!
//! One `fit` call walks this state machine, publishing each step:
//!
//! ```text
//! TrainBegin
//!   { EpochBegin
//!       EpochTrainBegin [BatchBegin BatchEnd]* EpochTrainEnd
//!       (EpochValidateBegin [BatchBegin BatchEnd]* EpochValidateEnd)?
//!     EpochEnd }+
//! TrainEnd
//! ```

mod core;
mod epoch;
mod result;
mod train_loop;


pub use self::core::{LossFn, Trainer, TrainerConfig, UpdateFn};
pub use result::{EpochLoss, TrainResult};
