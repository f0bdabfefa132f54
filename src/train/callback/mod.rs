//! Callback system for training events
//!
//! Listeners come in two shapes:
//! - hooks: a single closure bound to one event (`EventSender::add_hook`)
//! - callbacks: named bundles of handlers with their own state, attached and
//!   detached as a unit (`EventSender::attach_callback`)
//!
//! # Example
//!
//! ```rust
//! use ensayo::train::callback::{EventSender, FnCallback};
//! use ensayo::train::TrainEvent;
//!
//! let mut sender = EventSender::new();
//! sender.add_hook(TrainEvent::EpochEnd, |data| {
//!     if let Some(epoch) = data.epoch() {
//!         println!("epoch {epoch} finished");
//!     }
//! });
//! sender
//!     .attach_callback(FnCallback::new("noop").with(TrainEvent::TrainEnd, |_| {}), false)
//!     .unwrap();
//! assert_eq!(sender.callback_names(), vec!["noop"]);
//! ```

mod checkpoint;
mod closure;
mod manager;
mod progress;
mod reporter;
mod traits;

// Re-export all public types
pub use checkpoint::Saver;
pub use closure::FnCallback;
pub use manager::{EventSender, HookId};
pub use progress::ProgressCallback;
pub use reporter::{AccuracyFn, EpochRecord, History, PhaseMetrics, Reporter};
pub use traits::{Bindings, Callback, Handler, Method};
pub(crate) use traits::dispatch;
