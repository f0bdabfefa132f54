//! Event sender for dispatching events to hooks and callbacks
//!
//! `notify` runs every enabled hook registered for the event (registration
//! order), then every enabled callback that handles it (attach order). All
//! listeners receive the same `&mut EventData`.
//!
//! Dispatch is synchronous and non-reentrant: `notify` holds `&mut self`
//! for the whole call, so a listener cannot reach the sender that is
//! running it.

use std::collections::HashMap;

use super::traits::{Callback, Handler};
use crate::error::{Error, Result};
use crate::train::event::{EventData, TrainEvent};

/// Identifier returned by [`EventSender::add_hook`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HookId(u64);

struct HookEntry {
    id: HookId,
    handler: Handler,
    enabled: bool,
}

struct CallbackEntry {
    callback: Box<dyn Callback>,
    enabled: bool,
}

/// Publish-subscribe registry for training events
#[derive(Default)]
pub struct EventSender {
    hooks: HashMap<TrainEvent, Vec<HookEntry>>,
    callbacks: Vec<CallbackEntry>,
    next_hook: u64,
}

impl EventSender {
    /// Create an empty sender
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a hook for `event`
    pub fn add_hook<F>(&mut self, event: TrainEvent, hook: F) -> HookId
    where
        F: FnMut(&mut EventData<'_>) + 'static,
    {
        self.add_boxed_hook(event, Box::new(hook))
    }

    /// Register an already boxed hook for `event`
    pub fn add_boxed_hook(&mut self, event: TrainEvent, handler: Handler) -> HookId {
        let id = HookId(self.next_hook);
        self.next_hook += 1;
        self.hooks.entry(event).or_default().push(HookEntry { id, handler, enabled: true });
        id
    }

    /// Remove a hook; returns whether it was registered
    pub fn remove_hook(&mut self, id: HookId) -> bool {
        for entries in self.hooks.values_mut() {
            if let Some(pos) = entries.iter().position(|entry| entry.id == id) {
                entries.remove(pos);
                return true;
            }
        }
        false
    }

    /// Enable or disable a hook; returns whether it was registered
    pub fn set_hook_enabled(&mut self, id: HookId, enabled: bool) -> bool {
        match self.hooks.values_mut().flatten().find(|entry| entry.id == id) {
            Some(entry) => {
                entry.enabled = enabled;
                true
            }
            None => false,
        }
    }

    /// Hooks registered for `event`, enabled or not
    pub fn hook_count(&self, event: TrainEvent) -> usize {
        self.hooks.get(&event).map_or(0, Vec::len)
    }

    /// Attach a callback
    ///
    /// When a callback with the same name is attached, `update = true`
    /// replaces it in place (keeping its position and enabled state);
    /// `update = false` fails with [`Error::DuplicateCallback`].
    pub fn attach_callback<C: Callback + 'static>(&mut self, callback: C, update: bool) -> Result<()> {
        self.attach_boxed(Box::new(callback), update)
    }

    /// Attach an already boxed callback, see [`EventSender::attach_callback`]
    pub fn attach_boxed(&mut self, callback: Box<dyn Callback>, update: bool) -> Result<()> {
        match self.position(callback.name()) {
            Some(_) if !update => Err(Error::DuplicateCallback { name: callback.name().to_string() }),
            Some(pos) => {
                self.callbacks[pos].callback = callback;
                Ok(())
            }
            None => {
                self.callbacks.push(CallbackEntry { callback, enabled: true });
                Ok(())
            }
        }
    }

    /// Detach a callback by name, handing it back
    pub fn detach_callback(&mut self, name: &str) -> Option<Box<dyn Callback>> {
        let pos = self.position(name)?;
        Some(self.callbacks.remove(pos).callback)
    }

    /// Enable or disable a callback by name
    pub fn set_callback_enabled(&mut self, name: &str, enabled: bool) -> Result<()> {
        let pos = self.position(name).ok_or_else(|| Error::UnknownCallback { name: name.to_string() })?;
        self.callbacks[pos].enabled = enabled;
        Ok(())
    }

    /// Whether a callback with `name` is attached
    pub fn has_callback(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Whether the named callback is attached and enabled
    pub fn is_callback_enabled(&self, name: &str) -> bool {
        self.position(name).is_some_and(|pos| self.callbacks[pos].enabled)
    }

    /// Attached callback names in dispatch order
    pub fn callback_names(&self) -> Vec<&str> {
        self.callbacks.iter().map(|entry| entry.callback.name()).collect()
    }

    /// Number of attached callbacks
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    /// Check if no hooks or callbacks are registered
    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty() && self.hooks.values().all(Vec::is_empty)
    }

    /// Dispatch `event` to every enabled listener
    ///
    /// Events without listeners are a no-op.
    pub fn notify(&mut self, event: TrainEvent, data: &mut EventData<'_>) {
        if let Some(entries) = self.hooks.get_mut(&event) {
            for entry in entries.iter_mut().filter(|entry| entry.enabled) {
                (entry.handler)(data);
            }
        }
        for entry in self.callbacks.iter_mut().filter(|entry| entry.enabled) {
            if entry.callback.handles(event) {
                entry.callback.on_event(event, data);
            }
        }
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.callbacks.iter().position(|entry| entry.callback.name() == name)
    }
}

impl std::fmt::Debug for EventSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let hooks: usize = self.hooks.values().map(Vec::len).sum();
        f.debug_struct("EventSender")
            .field("hooks", &hooks)
            .field("callbacks", &self.callback_names())
            .finish()
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    proptest! {
        /// Hooks fire exactly once each, in registration order
        #[test]
        fn hooks_fire_in_registration_order(num_hooks in 1usize..12) {
            let order = Rc::new(RefCell::new(Vec::new()));
            let mut sender = EventSender::new();
            for i in 0..num_hooks {
                let order = order.clone();
                sender.add_hook(TrainEvent::BatchEnd, move |_| order.borrow_mut().push(i));
            }

            sender.notify(TrainEvent::BatchEnd, &mut EventData::Empty);

            prop_assert_eq!(order.borrow().clone(), (0..num_hooks).collect::<Vec<_>>());
        }
    }
}
