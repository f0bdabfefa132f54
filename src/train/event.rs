//! Lifecycle events and the typed records passed to their listeners
//!
//! Each `notify` call hands listeners a `&mut EventData`. The record is
//! created by the training loop for one lifecycle phase and dropped when the
//! phase is over. Listeners may mutate it; listeners that run later in the
//! same dispatch see those mutations.

use std::fmt;
use std::str::FromStr;

use ndarray::ArrayD;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::train::batch::Inputs;

/// Lifecycle points of a `fit` call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainEvent {
    /// Before the first epoch
    TrainBegin,
    /// After the last epoch
    TrainEnd,
    /// Start of an epoch
    EpochBegin,
    /// End of an epoch (after validation, if any)
    EpochEnd,
    /// Start of the training phase of an epoch
    EpochTrainBegin,
    /// End of the training phase, loss averaged
    EpochTrainEnd,
    /// Start of the validation phase of an epoch
    EpochValidateBegin,
    /// End of the validation phase, loss averaged
    EpochValidateEnd,
    /// Before the forward pass of a batch
    BatchBegin,
    /// After the forward pass (and update, when training) of a batch
    BatchEnd,
}

impl TrainEvent {
    /// Every event, in lifecycle order
    pub const ALL: [TrainEvent; 10] = [
        TrainEvent::TrainBegin,
        TrainEvent::EpochBegin,
        TrainEvent::EpochTrainBegin,
        TrainEvent::EpochValidateBegin,
        TrainEvent::BatchBegin,
        TrainEvent::BatchEnd,
        TrainEvent::EpochValidateEnd,
        TrainEvent::EpochTrainEnd,
        TrainEvent::EpochEnd,
        TrainEvent::TrainEnd,
    ];

    /// Snake-case event name
    pub fn as_str(self) -> &'static str {
        match self {
            TrainEvent::TrainBegin => "train_begin",
            TrainEvent::TrainEnd => "train_end",
            TrainEvent::EpochBegin => "epoch_begin",
            TrainEvent::EpochEnd => "epoch_end",
            TrainEvent::EpochTrainBegin => "epoch_train_begin",
            TrainEvent::EpochTrainEnd => "epoch_train_end",
            TrainEvent::EpochValidateBegin => "epoch_validate_begin",
            TrainEvent::EpochValidateEnd => "epoch_validate_end",
            TrainEvent::BatchBegin => "batch_begin",
            TrainEvent::BatchEnd => "batch_end",
        }
    }

    /// Phase-begin event for the training or validation phase
    pub fn phase_begin(train: bool) -> Self {
        if train {
            TrainEvent::EpochTrainBegin
        } else {
            TrainEvent::EpochValidateBegin
        }
    }

    /// Phase-end event for the training or validation phase
    pub fn phase_end(train: bool) -> Self {
        if train {
            TrainEvent::EpochTrainEnd
        } else {
            TrainEvent::EpochValidateEnd
        }
    }
}

impl fmt::Display for TrainEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrainEvent {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TrainEvent::ALL
            .into_iter()
            .find(|event| event.as_str() == s)
            .ok_or_else(|| Error::Config(format!("Unknown training event: {s}")))
    }
}

/// Record for `TrainBegin` / `TrainEnd`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrainContext {
    /// Number of epochs requested
    pub epochs: usize,
    /// Configured batch size
    pub batch_size: usize,
    /// Whether a validation phase runs each epoch
    pub validation: bool,
}

/// Record for `EpochBegin` / `EpochEnd`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpochContext {
    /// Epoch number, starting at 1
    pub epoch: usize,
    /// Training dataset size
    pub size: usize,
}

/// Record for the phase begin/end events
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseContext {
    /// Epoch number, starting at 1
    pub epoch: usize,
    /// `true` for the training phase, `false` for validation
    pub train: bool,
    /// Samples in the phase's dataset
    pub size: usize,
    /// Configured batch size
    pub batch_size: usize,
    /// `ceil(size / batch_size)`
    pub num_batches: usize,
    /// `None` at phase begin, mean batch loss at phase end
    pub loss: Option<f32>,
}

/// Record for `BatchBegin` / `BatchEnd`
#[derive(Debug, Clone)]
pub struct BatchContext {
    /// `true` while training, `false` while validating
    pub train: bool,
    /// Zero-based batch position in the phase
    pub batch_index: usize,
    /// Samples in this batch (the last one may be short)
    pub batch_size: usize,
    /// Model inputs
    pub xs: Inputs,
    /// Targets
    pub ts: ArrayD<f32>,
    /// Predictions, filled after the forward pass
    pub ys: Option<ArrayD<f32>>,
    /// Batch loss, filled after the forward pass
    pub loss: Option<f32>,
}

/// Mutable view handed to every listener of one `notify` call
#[derive(Debug)]
pub enum EventData<'a> {
    /// No record
    Empty,
    /// Whole-run record
    Train(&'a mut TrainContext),
    /// Epoch record
    Epoch(&'a mut EpochContext),
    /// Training/validation phase record
    Phase(&'a mut PhaseContext),
    /// Batch record
    Batch(&'a mut BatchContext),
}

impl EventData<'_> {
    /// Epoch number, when the record carries one
    pub fn epoch(&self) -> Option<usize> {
        match self {
            EventData::Epoch(ctx) => Some(ctx.epoch),
            EventData::Phase(ctx) => Some(ctx.epoch),
            _ => None,
        }
    }

    /// Whole-run record
    pub fn train(&self) -> Option<&TrainContext> {
        match self {
            EventData::Train(ctx) => Some(&**ctx),
            _ => None,
        }
    }

    /// Epoch record
    pub fn epoch_context(&self) -> Option<&EpochContext> {
        match self {
            EventData::Epoch(ctx) => Some(&**ctx),
            _ => None,
        }
    }

    /// Phase record
    pub fn phase(&self) -> Option<&PhaseContext> {
        match self {
            EventData::Phase(ctx) => Some(&**ctx),
            _ => None,
        }
    }

    /// Mutable phase record
    pub fn phase_mut(&mut self) -> Option<&mut PhaseContext> {
        match self {
            EventData::Phase(ctx) => Some(&mut **ctx),
            _ => None,
        }
    }

    /// Batch record
    pub fn batch(&self) -> Option<&BatchContext> {
        match self {
            EventData::Batch(ctx) => Some(&**ctx),
            _ => None,
        }
    }

    /// Mutable batch record
    pub fn batch_mut(&mut self) -> Option<&mut BatchContext> {
        match self {
            EventData::Batch(ctx) => Some(&mut **ctx),
            _ => None,
        }
    }
}
