//! Core Trainer struct and basic methods

use std::rc::Rc;
use std::time::Instant;

use ndarray::ArrayD;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::Result;
use crate::logging::{self, Logger};
use crate::optim::{default_update, Optimizer};
use crate::train::callback::{AccuracyFn, Callback, EventSender, Handler, HookId};
use crate::train::event::{EventData, TrainEvent};
use crate::train::progress_bar::ProgressBar;
use crate::train::Loss;

/// Loss function `(ys, ts) -> loss`
pub type LossFn<L> = Box<dyn Fn(&ArrayD<f32>, &ArrayD<f32>) -> L>;

/// Update strategy `(optimizer, loss)`, run once per training batch
pub type UpdateFn<O, L> = Box<dyn FnMut(&mut O, &L)>;

/// Extension bundle accepted by [`Trainer::configure`]
pub struct TrainerConfig<O, L> {
    /// Replacement update strategy
    pub update: Option<UpdateFn<O, L>>,
    /// Hooks, added in order
    pub hooks: Vec<(TrainEvent, Handler)>,
    /// Callbacks, attached in order
    pub callbacks: Vec<Box<dyn Callback>>,
}

impl<O, L> TrainerConfig<O, L> {
    /// Empty bundle
    pub fn new() -> Self {
        Self { update: None, hooks: Vec::new(), callbacks: Vec::new() }
    }

    /// Replace the update strategy
    pub fn with_update<U>(mut self, update: U) -> Self
    where
        U: FnMut(&mut O, &L) + 'static,
    {
        self.update = Some(Box::new(update));
        self
    }

    /// Add a hook
    pub fn with_hook<F>(mut self, event: TrainEvent, hook: F) -> Self
    where
        F: FnMut(&mut EventData<'_>) + 'static,
    {
        self.hooks.push((event, Box::new(hook)));
        self
    }

    /// Attach a callback
    pub fn with_callback<C: Callback + 'static>(mut self, callback: C) -> Self {
        self.callbacks.push(Box::new(callback));
        self
    }
}

impl<O, L> Default for TrainerConfig<O, L> {
    fn default() -> Self {
        Self::new()
    }
}

/// High-level trainer that orchestrates the training loop
///
/// A trainer owns an optimizer `O`, a model `M` (anything implementing
/// [`Forward`](crate::train::Forward)) and a loss function producing `L`.
/// Every lifecycle point of [`Trainer::fit`] is published on its
/// [`EventSender`].
///
/// # Example
///
/// ```
/// use ndarray::{arr1, arr2, ArrayD};
/// use ensayo::config::FitOptions;
/// use ensayo::train::{Inputs, Trainer};
///
/// let x = arr2(&[[0.0f32], [1.0], [2.0], [3.0]]).into_dyn();
/// let y = arr1(&[0.0f32, 2.0, 4.0, 6.0]).into_dyn();
///
/// let model = |xs: &Inputs| -> ArrayD<f32> { xs.columns()[0].sum_axis(ndarray::Axis(1)) * 2.0 };
/// let loss = |ys: &ArrayD<f32>, ts: &ArrayD<f32>| -> f32 { (ys - ts).mapv(|d| d * d).mean().unwrap_or(0.0) };
///
/// let mut trainer = Trainer::with_update((), model, loss, |_: &mut (), _: &f32| {});
/// let result = trainer.fit(x, y, None, &FitOptions::default().with_batch_size(2).with_epochs(3).with_verbose(false)).unwrap();
/// assert_eq!(result.epochs, 3);
/// assert_eq!(result.final_loss, 0.0);
/// ```
pub struct Trainer<O, M, L = f32> {
    pub(crate) optimizer: O,
    pub(crate) model: M,
    pub(crate) loss_fn: LossFn<L>,
    pub(crate) accuracy_fn: Option<AccuracyFn>,
    pub(crate) update: UpdateFn<O, L>,
    pub(crate) events: EventSender,
    pub(crate) logger: Rc<dyn Logger>,
    pub(crate) progress_bar: ProgressBar,
    pub(crate) rng: StdRng,
    pub(crate) start_time: Option<Instant>,
}

impl<O, M, L> Trainer<O, M, L>
where
    O: Optimizer + 'static,
    L: Loss + 'static,
{
    /// Create a trainer using the default update (zero_grad, backward, step)
    pub fn new<F>(optimizer: O, model: M, loss_fn: F) -> Self
    where
        F: Fn(&ArrayD<f32>, &ArrayD<f32>) -> L + 'static,
    {
        Self::with_update(optimizer, model, loss_fn, default_update::<O, L>)
    }
}

impl<O, M, L> Trainer<O, M, L> {
    /// Create a trainer with an explicit update strategy
    pub fn with_update<F, U>(optimizer: O, model: M, loss_fn: F, update: U) -> Self
    where
        F: Fn(&ArrayD<f32>, &ArrayD<f32>) -> L + 'static,
        U: FnMut(&mut O, &L) + 'static,
    {
        Self {
            optimizer,
            model,
            loss_fn: Box::new(loss_fn),
            accuracy_fn: None,
            update: Box::new(update),
            events: EventSender::new(),
            logger: logging::noop(),
            progress_bar: ProgressBar::default(),
            rng: StdRng::from_os_rng(),
            start_time: None,
        }
    }

    /// Report per-epoch accuracy through a [`Reporter`](crate::train::Reporter)
    pub fn with_accuracy<F>(mut self, accuracy_fn: F) -> Self
    where
        F: Fn(&ArrayD<f32>, &ArrayD<f32>) -> f32 + 'static,
    {
        self.accuracy_fn = Some(Rc::new(accuracy_fn));
        self
    }

    /// Route default observer output through `logger`
    pub fn with_logger(mut self, logger: Rc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    /// Replace the logger
    pub fn set_logger(&mut self, logger: Rc<dyn Logger>) {
        self.logger = logger;
    }

    /// Bar used by the default progress callback
    pub fn with_progress_bar(mut self, bar: ProgressBar) -> Self {
        self.progress_bar = bar;
        self
    }

    /// Seed the shuffling RNG
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Replace the update strategy
    pub fn set_update<U>(&mut self, update: U)
    where
        U: FnMut(&mut O, &L) + 'static,
    {
        self.update = Box::new(update);
    }

    /// Apply an extension bundle
    ///
    /// Callbacks are attached without replacement, so a name that is already
    /// attached fails with [`Error::DuplicateCallback`](crate::Error::DuplicateCallback).
    /// Hooks and callbacks applied before the failing one stay registered.
    pub fn configure(&mut self, config: TrainerConfig<O, L>) -> Result<()> {
        if let Some(update) = config.update {
            self.update = update;
        }
        for (event, hook) in config.hooks {
            self.events.add_boxed_hook(event, hook);
        }
        for callback in config.callbacks {
            self.events.attach_boxed(callback, false)?;
        }
        Ok(())
    }

    /// Register a hook on the trainer's event sender
    pub fn add_hook<F>(&mut self, event: TrainEvent, hook: F) -> HookId
    where
        F: FnMut(&mut EventData<'_>) + 'static,
    {
        self.events.add_hook(event, hook)
    }

    /// Attach a callback to the trainer's event sender
    pub fn attach_callback<C: Callback + 'static>(&mut self, callback: C, update: bool) -> Result<()> {
        self.events.attach_callback(callback, update)
    }

    /// Event sender
    pub fn events(&self) -> &EventSender {
        &self.events
    }

    /// Mutable event sender
    pub fn events_mut(&mut self) -> &mut EventSender {
        &mut self.events
    }

    /// Optimizer
    pub fn optimizer(&self) -> &O {
        &self.optimizer
    }

    /// Mutable optimizer
    pub fn optimizer_mut(&mut self) -> &mut O {
        &mut self.optimizer
    }

    /// Model
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Mutable model
    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    /// Consume the trainer, returning optimizer and model
    pub fn into_parts(self) -> (O, M) {
        (self.optimizer, self.model)
    }

    /// Compute elapsed seconds from start_time
    pub(super) fn elapsed_secs(&self) -> f64 {
        self.start_time.map_or(0.0, |t| t.elapsed().as_secs_f64())
    }
}

impl<O, M, L> std::fmt::Debug for Trainer<O, M, L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Trainer")
            .field("events", &self.events)
            .field("accuracy", &self.accuracy_fn.is_some())
            .finish_non_exhaustive()
    }
}
