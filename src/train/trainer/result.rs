//! Training result types

use serde::{Deserialize, Serialize};

use crate::train::callback::EpochRecord;

/// Mean losses of one epoch
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpochLoss {
    /// Epoch number, starting at 1
    pub epoch: usize,
    /// Training phase loss
    pub training: f32,
    /// Validation phase loss, when validation ran
    pub validation: Option<f32>,
}

/// Result of a training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainResult {
    /// Epochs completed
    pub epochs: usize,
    /// Training loss of the last epoch
    pub final_loss: f32,
    /// Lowest epoch loss (validation loss when available)
    pub best_loss: f32,
    /// Per-epoch losses
    pub losses: Vec<EpochLoss>,
    /// Accuracy history, filled when an accuracy function is set
    pub history: Vec<EpochRecord>,
    /// Total training time in seconds
    pub elapsed_secs: f64,
}

impl TrainResult {
    /// Validation loss of the last epoch
    pub fn final_validation_loss(&self) -> Option<f32> {
        self.losses.last().and_then(|loss| loss.validation)
    }
}
