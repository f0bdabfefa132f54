//! Core traits and types for the callback system
//!
//! - `Handler` - a boxed listener, the unit a hook is made of
//! - `Method` / `Bindings` - per-callback table from event to handler method
//! - `Callback` - the trait every attachable callback implements

use std::collections::BTreeMap;
use std::fmt;

use crate::train::event::{EventData, TrainEvent};

/// Free-standing listener bound to one event
pub type Handler = Box<dyn FnMut(&mut EventData<'_>)>;

/// Handler method of a callback type `C`
pub type Method<C> = fn(&mut C, &mut EventData<'_>);

/// Event → method table owned by a callback
///
/// At most one method per event; [`Bindings::implement`] replaces an
/// existing binding.
pub struct Bindings<C> {
    table: BTreeMap<TrainEvent, Method<C>>,
}

impl<C> Bindings<C> {
    /// Empty table
    pub fn new() -> Self {
        Self { table: BTreeMap::new() }
    }

    /// Builder-style binding used when assembling the default table
    pub fn with(mut self, event: TrainEvent, method: Method<C>) -> Self {
        self.table.insert(event, method);
        self
    }

    /// Bind `method` to `event`, returning the method it replaced
    pub fn implement(&mut self, event: TrainEvent, method: Method<C>) -> Option<Method<C>> {
        self.table.insert(event, method)
    }

    /// Remove the binding for `event`
    pub fn unbind(&mut self, event: TrainEvent) -> Option<Method<C>> {
        self.table.remove(&event)
    }

    /// Method bound to `event`
    pub fn get(&self, event: TrainEvent) -> Option<Method<C>> {
        self.table.get(&event).copied()
    }

    /// Whether `event` has a binding
    pub fn contains(&self, event: TrainEvent) -> bool {
        self.table.contains_key(&event)
    }

    /// Bound events
    pub fn events(&self) -> impl Iterator<Item = TrainEvent> + '_ {
        self.table.keys().copied()
    }
}

impl<C> Default for Bindings<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Clone for Bindings<C> {
    fn clone(&self) -> Self {
        Self { table: self.table.clone() }
    }
}

impl<C> fmt::Debug for Bindings<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.table.keys()).finish()
    }
}

/// Trait for attachable callbacks
///
/// A callback is a named bundle of handlers with its own state. The
/// `EventSender` asks `handles` before dispatching, so a callback that does
/// not bind an event is skipped for it.
pub trait Callback {
    /// Unique name within one `EventSender`
    fn name(&self) -> &str;

    /// Whether this callback has a handler for `event`
    fn handles(&self, event: TrainEvent) -> bool;

    /// Run the handler for `event`
    fn on_event(&mut self, event: TrainEvent, data: &mut EventData<'_>);
}

/// Dispatch through a `Bindings` table owned by `callback`
///
/// The method pointer is copied out before the call so the callback can be
/// borrowed mutably by its own method.
pub(crate) fn dispatch<C>(
    callback: &mut C,
    bindings: impl Fn(&C) -> &Bindings<C>,
    event: TrainEvent,
    data: &mut EventData<'_>,
) {
    if let Some(method) = bindings(callback).get(event) {
        method(callback, data);
    }
}
