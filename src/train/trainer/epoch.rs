//! One training or validation phase

use super::core::Trainer;
use crate::dataset::Dataset;
use crate::error::Result;
use crate::train::event::{BatchContext, EventData, PhaseContext, TrainEvent};
use crate::train::{Batch, Forward, Loss};

impl<O, M, L> Trainer<O, M, L>
where
    M: Forward,
    L: Loss,
{
    /// Run one phase over `dataset`
    ///
    /// Training phases shuffle the samples and run the update strategy after
    /// every batch; validation phases do neither. Returns the phase loss: the
    /// plain mean of the batch losses, where a short last batch counts as
    /// much as a full one.
    pub fn process(
        &mut self,
        dataset: &Dataset,
        epoch: usize,
        batch_size: usize,
        train: bool,
    ) -> Result<f32> {
        let batches = dataset.batches(batch_size, train, &mut self.rng)?;
        let num_batches = dataset.num_batches(batch_size);

        let mut phase = PhaseContext {
            epoch,
            train,
            size: dataset.size(),
            batch_size,
            num_batches,
            loss: None,
        };
        self.events.notify(TrainEvent::phase_begin(train), &mut EventData::Phase(&mut phase));

        let mut total_loss = 0.0;
        for (batch_index, columns) in batches.enumerate() {
            let batch = Batch::from_columns(columns)?;
            total_loss += self.process_batch(batch, batch_index, train);
        }

        phase.loss = Some(safe_avg(total_loss, num_batches));
        self.events.notify(TrainEvent::phase_end(train), &mut EventData::Phase(&mut phase));
        Ok(phase.loss.unwrap_or(0.0))
    }

    /// Forward, loss, update (training only); returns the batch loss
    fn process_batch(&mut self, batch: Batch, batch_index: usize, train: bool) -> f32 {
        let batch_size = batch.size();
        let mut ctx = BatchContext {
            train,
            batch_index,
            batch_size,
            xs: batch.inputs,
            ts: batch.targets,
            ys: None,
            loss: None,
        };
        self.events.notify(TrainEvent::BatchBegin, &mut EventData::Batch(&mut ctx));

        let ys = self.model.forward(&ctx.xs);
        let loss = (self.loss_fn)(&ys, &ctx.ts);
        let value = loss.value();
        ctx.ys = Some(ys);
        ctx.loss = Some(value);

        if train {
            (self.update)(&mut self.optimizer, &loss);
        }
        drop(loss);
        self.events.notify(TrainEvent::BatchEnd, &mut EventData::Batch(&mut ctx));
        value
    }
}

/// Safely compute average, returning 0.0 for empty sets
pub(super) fn safe_avg(total: f32, count: usize) -> f32 {
    if count > 0 {
        total / count as f32
    } else {
        0.0
    }
}
