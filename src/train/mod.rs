//! Training harness
//!
//! This module provides an event-driven training loop with:
//! - Lifecycle events and typed records (`TrainEvent`, `EventData`)
//! - Hooks and callbacks dispatched by an `EventSender`
//! - Built-in callbacks: progress bar, accuracy reporter, checkpoint saver
//! - A `Trainer` with injectable forward, loss and update strategies
//!
//! # Example
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use ndarray::{arr1, arr2, ArrayD, Axis};
//! use ensayo::config::FitOptions;
//! use ensayo::train::{Inputs, TrainEvent, Trainer};
//!
//! let x = arr2(&[[1.0f32], [2.0], [3.0]]).into_dyn();
//! let y = arr1(&[1.0f32, 2.0, 3.0]).into_dyn();
//!
//! let model = |xs: &Inputs| -> ArrayD<f32> { xs.columns()[0].sum_axis(Axis(1)) };
//! let loss = |ys: &ArrayD<f32>, ts: &ArrayD<f32>| -> f32 { (ys - ts).mapv(f32::abs).sum() };
//! let mut trainer = Trainer::with_update((), model, loss, |_: &mut (), _: &f32| {});
//!
//! let epochs = Rc::new(Cell::new(0));
//! let counter = Rc::clone(&epochs);
//! trainer.add_hook(TrainEvent::EpochEnd, move |_| counter.set(counter.get() + 1));
//!
//! let options = FitOptions::default().with_batch_size(2).with_epochs(2).with_verbose(false);
//! trainer.fit(x, y, None, &options).unwrap();
//! assert_eq!(epochs.get(), 2);
//! ```

mod batch;
pub mod callback;
mod event;
mod forward;
mod loss;
mod progress_bar;
mod trainer;

pub use batch::{Batch, Inputs};
pub use callback::{
    AccuracyFn, Bindings, Callback, EpochRecord, EventSender, FnCallback, Handler, History,
    HookId, Method, PhaseMetrics, ProgressCallback, Reporter, Saver,
};
pub use event::{BatchContext, EpochContext, EventData, PhaseContext, TrainContext, TrainEvent};
pub use forward::Forward;
pub use loss::Loss;
pub use progress_bar::{format_duration, DrawTarget, ProgressBar};
pub use trainer::{EpochLoss, LossFn, TrainResult, Trainer, TrainerConfig, UpdateFn};
