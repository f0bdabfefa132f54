//! Ensayo: event-driven training harness with text preprocessing
//!
//! # Modules
//!
//! - [`train`]: `Trainer`, lifecycle events, hooks and callbacks
//! - [`preprocessing`]: vocabulary, tokenization and embedding tables
//! - [`config`]: YAML harness configuration with validation
//! - [`dataset`]: columnar datasets and mini-batch iteration
//! - [`optim`]: the optimizer interface the trainer drives
//! - [`logging`]: injectable logger
//!
//! # Example
//!
//! ```
//! use ensayo::preprocessing::Preprocessor;
//!
//! let mut pre = Preprocessor::new(16).unwrap();
//! let ids = pre.fit_transform(&["a b c", "c b"], Some(4)).unwrap();
//! assert_eq!(ids[1], vec![3, 2, -1, -1]);
//! ```

pub mod config;
pub mod dataset;
pub mod error;
pub mod logging;
pub mod optim;
pub mod preprocessing;
pub mod train;

pub use error::{Error, Result};
pub use logging::{Logger, NoopLogger, TracingLogger};
