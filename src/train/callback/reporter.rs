//! Per-epoch accuracy/loss reporter

use std::cell::RefCell;
use std::rc::Rc;

use ndarray::ArrayD;
use serde::{Deserialize, Serialize};

use super::traits::{dispatch, Bindings, Callback, Method};
use crate::logging::{self, Logger};
use crate::train::event::{EventData, TrainEvent};

/// Accuracy metric `(ys, ts) -> accuracy`
pub type AccuracyFn = Rc<dyn Fn(&ArrayD<f32>, &ArrayD<f32>) -> f32>;

/// Accuracy and loss of one phase
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseMetrics {
    /// Mean batch accuracy
    pub accuracy: f32,
    /// Mean batch loss
    pub loss: f32,
}

/// Metrics of one epoch
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpochRecord {
    /// Training phase
    pub training: PhaseMetrics,
    /// Validation phase, when one ran
    pub validation: Option<PhaseMetrics>,
}

/// Shared, growing list of epoch records
pub type History = Rc<RefCell<Vec<EpochRecord>>>;

/// Averages batch accuracy over each phase and records it with the phase loss
pub struct Reporter {
    name: String,
    accuracy_fn: AccuracyFn,
    accuracy_sum: f32,
    history: History,
    logger: Rc<dyn Logger>,
    bindings: Bindings<Self>,
}

impl Reporter {
    /// Default callback name
    pub const NAME: &'static str = "reporter";

    /// Reporter computing batch accuracy with `accuracy_fn`
    pub fn new(accuracy_fn: AccuracyFn) -> Self {
        let bindings = Bindings::new()
            .with(TrainEvent::EpochTrainBegin, Self::reset)
            .with(TrainEvent::EpochValidateBegin, Self::reset)
            .with(TrainEvent::BatchEnd, Self::accumulate)
            .with(TrainEvent::EpochTrainEnd, Self::report_training)
            .with(TrainEvent::EpochValidateEnd, Self::report_validation);
        Self {
            name: Self::NAME.to_string(),
            accuracy_fn,
            accuracy_sum: 0.0,
            history: History::default(),
            logger: logging::noop(),
            bindings,
        }
    }

    /// Route the accuracy lines through `logger`
    pub fn with_logger(mut self, logger: Rc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    /// Bind (or replace) a handler
    pub fn implement(&mut self, event: TrainEvent, method: Method<Self>) {
        self.bindings.implement(event, method);
    }

    /// Handle on the recorded history
    pub fn history(&self) -> History {
        Rc::clone(&self.history)
    }

    fn reset(&mut self, _data: &mut EventData<'_>) {
        self.accuracy_sum = 0.0;
    }

    fn accumulate(&mut self, data: &mut EventData<'_>) {
        if let Some(batch) = data.batch() {
            if let Some(ys) = &batch.ys {
                self.accuracy_sum += (self.accuracy_fn)(ys, &batch.ts);
            }
        }
    }

    fn phase_metrics(&self, data: &EventData<'_>) -> Option<PhaseMetrics> {
        let phase = data.phase()?;
        let accuracy = if phase.num_batches == 0 {
            0.0
        } else {
            self.accuracy_sum / phase.num_batches as f32
        };
        Some(PhaseMetrics { accuracy, loss: phase.loss.unwrap_or(0.0) })
    }

    fn report_training(&mut self, data: &mut EventData<'_>) {
        if let Some(metrics) = self.phase_metrics(data) {
            self.logger.info(&format!("[training] accuracy: {}", metrics.accuracy));
            self.history.borrow_mut().push(EpochRecord { training: metrics, validation: None });
        }
    }

    fn report_validation(&mut self, data: &mut EventData<'_>) {
        if let Some(metrics) = self.phase_metrics(data) {
            self.logger.info(&format!("[validation] accuracy: {}", metrics.accuracy));
            if let Some(last) = self.history.borrow_mut().last_mut() {
                last.validation = Some(metrics);
            }
        }
    }
}

impl std::fmt::Debug for Reporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reporter")
            .field("name", &self.name)
            .field("accuracy_sum", &self.accuracy_sum)
            .field("epochs", &self.history.borrow().len())
            .finish()
    }
}

impl Callback for Reporter {
    fn name(&self) -> &str {
        &self.name
    }

    fn handles(&self, event: TrainEvent) -> bool {
        self.bindings.contains(event)
    }

    fn on_event(&mut self, event: TrainEvent, data: &mut EventData<'_>) {
        dispatch(self, |cb| &cb.bindings, event, data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::testing::RecordingLogger;
    use crate::train::batch::Inputs;
    use crate::train::event::{BatchContext, PhaseContext};
    use approx::assert_relative_eq;
    use ndarray::arr1;

    fn phase(train: bool, num_batches: usize, loss: Option<f32>) -> PhaseContext {
        PhaseContext { epoch: 1, train, size: 4, batch_size: 2, num_batches, loss }
    }

    fn batch(ys: Option<Vec<f32>>) -> BatchContext {
        BatchContext {
            train: true,
            batch_index: 0,
            batch_size: 2,
            xs: Inputs::Single(arr1(&[0.0, 0.0]).into_dyn()),
            ts: arr1(&[1.0, 0.0]).into_dyn(),
            ys: ys.map(|v| arr1(&v).into_dyn()),
            loss: None,
        }
    }

    /// Fraction of exact matches
    fn exact_match() -> AccuracyFn {
        Rc::new(|ys: &ArrayD<f32>, ts: &ArrayD<f32>| {
            let hits = ys.iter().zip(ts.iter()).filter(|(y, t)| y == t).count();
            hits as f32 / ts.len() as f32
        })
    }

    fn run_phase(reporter: &mut Reporter, train: bool, outputs: &[Vec<f32>], loss: f32) {
        let mut begin = phase(train, outputs.len(), None);
        reporter.on_event(TrainEvent::phase_begin(train), &mut EventData::Phase(&mut begin));
        for ys in outputs {
            let mut ctx = batch(Some(ys.clone()));
            reporter.on_event(TrainEvent::BatchEnd, &mut EventData::Batch(&mut ctx));
        }
        let mut end = phase(train, outputs.len(), Some(loss));
        reporter.on_event(TrainEvent::phase_end(train), &mut EventData::Phase(&mut end));
    }

    #[test]
    fn test_reporter_averages_over_batches() {
        let mut reporter = Reporter::new(exact_match());
        run_phase(&mut reporter, true, &[vec![1.0, 0.0], vec![0.0, 0.0]], 0.25);

        let history = reporter.history();
        let history = history.borrow();
        assert_eq!(history.len(), 1);
        assert_relative_eq!(history[0].training.accuracy, 0.75);
        assert_relative_eq!(history[0].training.loss, 0.25);
        assert!(history[0].validation.is_none());
    }

    #[test]
    fn test_reporter_validation_fills_last_record() {
        let mut reporter = Reporter::new(exact_match());
        run_phase(&mut reporter, true, &[vec![1.0, 0.0]], 0.5);
        run_phase(&mut reporter, false, &[vec![0.0, 1.0]], 0.9);

        let history = reporter.history();
        let record = history.borrow()[0];
        assert_relative_eq!(record.training.accuracy, 1.0);
        let validation = record.validation.unwrap();
        assert_relative_eq!(validation.accuracy, 0.0);
        assert_relative_eq!(validation.loss, 0.9);
    }

    #[test]
    fn test_reporter_sum_resets_between_phases() {
        let mut reporter = Reporter::new(exact_match());
        run_phase(&mut reporter, true, &[vec![1.0, 0.0]], 0.0);
        run_phase(&mut reporter, true, &[vec![0.0, 1.0]], 0.0);

        let history = reporter.history();
        let history = history.borrow();
        assert_eq!(history.len(), 2);
        assert_relative_eq!(history[1].training.accuracy, 0.0);
    }

    #[test]
    fn test_reporter_skips_batches_without_predictions() {
        let mut reporter = Reporter::new(exact_match());
        let mut begin = phase(true, 1, None);
        reporter.on_event(TrainEvent::EpochTrainBegin, &mut EventData::Phase(&mut begin));
        let mut ctx = batch(None);
        reporter.on_event(TrainEvent::BatchEnd, &mut EventData::Batch(&mut ctx));
        let mut end = phase(true, 1, Some(1.0));
        reporter.on_event(TrainEvent::EpochTrainEnd, &mut EventData::Phase(&mut end));

        assert_relative_eq!(reporter.history().borrow()[0].training.accuracy, 0.0);
    }

    #[test]
    fn test_reporter_logs_accuracy() {
        let logger = Rc::new(RecordingLogger::default());
        let mut reporter = Reporter::new(exact_match()).with_logger(logger.clone());
        run_phase(&mut reporter, true, &[vec![1.0, 0.0]], 0.1);
        run_phase(&mut reporter, false, &[vec![1.0, 0.0]], 0.1);

        assert!(logger.contains("[training] accuracy: 1"));
        assert!(logger.contains("[validation] accuracy: 1"));
    }

    #[test]
    fn test_validation_without_training_record_is_ignored() {
        let mut reporter = Reporter::new(exact_match());
        run_phase(&mut reporter, false, &[vec![1.0, 0.0]], 0.1);
        assert!(reporter.history().borrow().is_empty());
    }

    #[test]
    fn test_epoch_record_serializes() {
        let record = EpochRecord {
            training: PhaseMetrics { accuracy: 0.5, loss: 1.0 },
            validation: None,
        };
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"training":{"accuracy":0.5,"loss":1.0},"validation":null}"#);
    }
}
