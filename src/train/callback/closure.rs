//! Callback assembled from closures

use std::collections::BTreeMap;
use std::fmt;

use super::traits::{Callback, Handler};
use crate::train::event::{EventData, TrainEvent};

/// Named callback whose handlers are closures bound with [`FnCallback::implement`]
///
/// ```
/// use ensayo::train::{EventSender, FnCallback, TrainEvent};
///
/// let mut cb = FnCallback::new("printer");
/// cb.implement(TrainEvent::EpochEnd, |data| {
///     if let Some(epoch) = data.epoch() {
///         println!("epoch {epoch} done");
///     }
/// });
///
/// let mut sender = EventSender::new();
/// sender.attach_callback(cb, false).unwrap();
/// ```
pub struct FnCallback {
    name: String,
    handlers: BTreeMap<TrainEvent, Handler>,
}

impl FnCallback {
    /// Callback with no handlers yet
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), handlers: BTreeMap::new() }
    }

    /// Bind (or replace) the handler for `event`
    pub fn implement<F>(&mut self, event: TrainEvent, handler: F) -> &mut Self
    where
        F: FnMut(&mut EventData<'_>) + 'static,
    {
        self.handlers.insert(event, Box::new(handler));
        self
    }

    /// Builder-style variant of [`FnCallback::implement`]
    pub fn with<F>(mut self, event: TrainEvent, handler: F) -> Self
    where
        F: FnMut(&mut EventData<'_>) + 'static,
    {
        self.implement(event, handler);
        self
    }
}

impl fmt::Debug for FnCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnCallback")
            .field("name", &self.name)
            .field("events", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Callback for FnCallback {
    fn name(&self) -> &str {
        &self.name
    }

    fn handles(&self, event: TrainEvent) -> bool {
        self.handlers.contains_key(&event)
    }

    fn on_event(&mut self, event: TrainEvent, data: &mut EventData<'_>) {
        if let Some(handler) = self.handlers.get_mut(&event) {
            handler(data);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_fn_callback_handles_bound_events_only() {
        let cb = FnCallback::new("x").with(TrainEvent::BatchEnd, |_| {});
        assert_eq!(cb.name(), "x");
        assert!(cb.handles(TrainEvent::BatchEnd));
        assert!(!cb.handles(TrainEvent::BatchBegin));
    }

    #[test]
    fn test_fn_callback_implement_overrides() {
        let hits = Rc::new(Cell::new(0));
        let (a, b) = (hits.clone(), hits.clone());
        let mut cb = FnCallback::new("x");
        cb.implement(TrainEvent::EpochEnd, move |_| a.set(a.get() + 1));
        cb.implement(TrainEvent::EpochEnd, move |_| b.set(b.get() + 10));

        cb.on_event(TrainEvent::EpochEnd, &mut EventData::Empty);
        cb.on_event(TrainEvent::TrainEnd, &mut EventData::Empty);

        assert_eq!(hits.get(), 10);
    }

    #[test]
    fn test_fn_callback_debug() {
        let cb = FnCallback::new("dbg").with(TrainEvent::TrainBegin, |_| {});
        let rendered = format!("{cb:?}");
        assert!(rendered.contains("dbg"));
        assert!(rendered.contains("TrainBegin"));
    }
}
