//! Multi-epoch training loop

use std::rc::Rc;
use std::time::Instant;

use ndarray::ArrayD;
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::core::Trainer;
use super::result::{EpochLoss, TrainResult};
use crate::config::{validate_fit, FitOptions, ValidationError};
use crate::dataset::Dataset;
use crate::error::{Error, Result};
use crate::train::callback::{History, HookId, ProgressCallback, Reporter};
use crate::train::event::{EpochContext, EventData, TrainContext, TrainEvent};
use crate::train::{Forward, Loss};

/// Observers installed by one `fit` call
struct FitObservers {
    hooks: Vec<HookId>,
    history: Option<History>,
}

impl<O, M, L> Trainer<O, M, L>
where
    M: Forward,
    L: Loss,
{
    /// Train on `(x, y)` for `options.epochs` epochs
    ///
    /// `validation_data`, when given, must hold exactly `[x_val, y_val]`;
    /// any other length fails with [`Error::InvalidValidationData`] before
    /// anything runs.
    ///
    /// Default observers are wired first: a progress bar when
    /// `options.verbose`, epoch summary log lines, and a
    /// [`Reporter`] when an accuracy function was set. The log hooks are
    /// removed again when `fit` returns; the progress callback and reporter
    /// stay attached and are replaced by the next `fit`. A fit without
    /// `verbose` detaches the progress callback.
    pub fn fit(
        &mut self,
        x: ArrayD<f32>,
        y: ArrayD<f32>,
        validation_data: Option<Vec<ArrayD<f32>>>,
        options: &FitOptions,
    ) -> Result<TrainResult> {
        let validation = match validation_data {
            Some(data) => {
                let [val_x, val_y] = <[ArrayD<f32>; 2]>::try_from(data)
                    .map_err(|data| Error::InvalidValidationData { len: data.len() })?;
                Some(Dataset::from_xy(val_x, val_y)?)
            }
            None => None,
        };
        let train = Dataset::from_xy(x, y)?;
        self.fit_dataset(&train, validation.as_ref(), options)
    }

    /// Train on prepared datasets
    pub fn fit_dataset(
        &mut self,
        train: &Dataset,
        validation: Option<&Dataset>,
        options: &FitOptions,
    ) -> Result<TrainResult> {
        validate_fit(options).map_err(|e| match e {
            ValidationError::InvalidBatchSize(_) => Error::InvalidBatchSize,
            other => Error::Config(format!("Invalid fit options: {other}")),
        })?;
        if let Some(seed) = options.seed {
            self.rng = StdRng::seed_from_u64(seed);
        }

        let observers = self.init_events_on_fit(validation.is_some(), options.verbose)?;
        let result = self.run_epochs(train, validation, options, observers.history.as_ref());
        for id in observers.hooks {
            self.events.remove_hook(id);
        }
        result
    }

    fn run_epochs(
        &mut self,
        train: &Dataset,
        validation: Option<&Dataset>,
        options: &FitOptions,
        history: Option<&History>,
    ) -> Result<TrainResult> {
        self.start_time = Some(Instant::now());
        let mut losses = Vec::with_capacity(options.epochs);
        let mut best_loss: Option<f32> = None;

        let mut run = TrainContext {
            epochs: options.epochs,
            batch_size: options.batch_size,
            validation: validation.is_some(),
        };
        self.events.notify(TrainEvent::TrainBegin, &mut EventData::Train(&mut run));

        for epoch in 1..=options.epochs {
            let mut epoch_ctx = EpochContext { epoch, size: train.size() };
            self.events.notify(TrainEvent::EpochBegin, &mut EventData::Epoch(&mut epoch_ctx));

            let training = self.process(train, epoch, options.batch_size, true)?;
            let validation_loss = match validation {
                Some(dataset) => Some(self.process(dataset, epoch, options.batch_size, false)?),
                None => None,
            };

            self.events.notify(TrainEvent::EpochEnd, &mut EventData::Epoch(&mut epoch_ctx));

            let tracked = validation_loss.unwrap_or(training);
            if best_loss.is_none_or(|best| tracked < best) {
                best_loss = Some(tracked);
            }
            losses.push(EpochLoss { epoch, training, validation: validation_loss });
        }

        self.events.notify(TrainEvent::TrainEnd, &mut EventData::Train(&mut run));

        let final_loss = losses.last().map_or(0.0, |loss| loss.training);
        Ok(TrainResult {
            epochs: losses.len(),
            final_loss,
            best_loss: best_loss.unwrap_or(final_loss),
            losses,
            history: history.map(|h| h.borrow().clone()).unwrap_or_default(),
            elapsed_secs: self.elapsed_secs(),
        })
    }

    fn init_events_on_fit(&mut self, do_validation: bool, verbose: bool) -> Result<FitObservers> {
        let mut hooks = Vec::new();

        if verbose {
            let mut callback = ProgressCallback::with_bar(self.progress_bar.clone());
            if do_validation {
                callback = callback.with_validation();
            }
            self.events.attach_callback(callback, true)?;
        } else {
            self.events.detach_callback(ProgressCallback::NAME);
        }

        let logger = Rc::clone(&self.logger);
        hooks.push(self.events.add_hook(TrainEvent::EpochTrainEnd, move |data| {
            if let Some(phase) = data.phase() {
                logger.info(&format!(
                    "[training] epoch {} - #samples: {}, loss: {}",
                    phase.epoch,
                    phase.size,
                    phase.loss.unwrap_or(0.0)
                ));
            }
        }));
        if do_validation {
            let logger = Rc::clone(&self.logger);
            hooks.push(self.events.add_hook(TrainEvent::EpochValidateEnd, move |data| {
                if let Some(phase) = data.phase() {
                    logger.info(&format!(
                        "[validation] epoch {} - #samples: {}, loss: {}",
                        phase.epoch,
                        phase.size,
                        phase.loss.unwrap_or(0.0)
                    ));
                }
            }));
        }

        let mut history = None;
        if let Some(accuracy_fn) = &self.accuracy_fn {
            let reporter =
                Reporter::new(Rc::clone(accuracy_fn)).with_logger(Rc::clone(&self.logger));
            history = Some(reporter.history());
            self.events.attach_callback(reporter, true)?;
        }

        let logger = Rc::clone(&self.logger);
        hooks.push(self.events.add_hook(TrainEvent::EpochEnd, move |_| logger.verbose("-")));

        Ok(FitObservers { hooks, history })
    }
}
