//! Progress callback rendering a per-phase progress bar

use super::traits::{dispatch, Bindings, Callback, Method};
use crate::train::event::{EventData, TrainEvent};
use crate::train::progress_bar::ProgressBar;

/// Progress callback for the training phase (and, once wired, validation)
///
/// The default table draws the bar during the training phase only;
/// [`ProgressCallback::with_validation`] binds the validation phase too.
#[derive(Debug, Clone)]
pub struct ProgressCallback {
    name: String,
    bar: ProgressBar,
    batch_size: usize,
    bindings: Bindings<Self>,
}

impl ProgressCallback {
    /// Default callback name
    pub const NAME: &'static str = "progress_callback";

    /// Create progress callback drawing on stderr
    pub fn new() -> Self {
        Self::with_bar(ProgressBar::default())
    }

    /// Create progress callback with a custom bar
    pub fn with_bar(bar: ProgressBar) -> Self {
        let bindings = Bindings::new()
            .with(TrainEvent::EpochTrainBegin, Self::init_progressbar)
            .with(TrainEvent::BatchBegin, Self::update_progressbar)
            .with(TrainEvent::EpochTrainEnd, Self::finish_progressbar);
        Self { name: Self::NAME.to_string(), bar, batch_size: 0, bindings }
    }

    /// Also draw the bar during the validation phase
    pub fn with_validation(mut self) -> Self {
        self.implement(TrainEvent::EpochValidateBegin, Self::init_progressbar);
        self.implement(TrainEvent::EpochValidateEnd, Self::finish_progressbar);
        self
    }

    /// Bind (or replace) a handler
    pub fn implement(&mut self, event: TrainEvent, method: Method<Self>) {
        self.bindings.implement(event, method);
    }

    /// The bar
    pub fn bar(&self) -> &ProgressBar {
        &self.bar
    }

    /// Start the bar at the size of the phase's dataset
    pub fn init_progressbar(&mut self, data: &mut EventData<'_>) {
        if let Some(phase) = data.phase() {
            self.batch_size = phase.batch_size;
            self.bar.start(phase.size);
        }
    }

    /// Advance the bar to the first sample of the incoming batch
    pub fn update_progressbar(&mut self, data: &mut EventData<'_>) {
        if let Some(batch) = data.batch() {
            self.bar.update(self.batch_size * batch.batch_index + 1);
        }
    }

    /// Complete the bar
    pub fn finish_progressbar(&mut self, _data: &mut EventData<'_>) {
        self.bar.finish();
    }
}

impl Default for ProgressCallback {
    fn default() -> Self {
        Self::new()
    }
}

impl Callback for ProgressCallback {
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
