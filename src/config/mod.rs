//! Declarative configuration
//!
//! A harness is described in YAML:
//!
//! ```
//! use ensayo::config::HarnessSpec;
//!
//! let spec = HarnessSpec::from_yaml_str("fit:\n  batch_size: 4\n  epochs: 2\n").unwrap();
//! assert_eq!(spec.fit.batch_size, 4);
//! assert!(spec.saver.is_none());
//! ```

mod schema;
mod validate;

pub use schema::{FitOptions, HarnessSpec, PreprocessorConfig, SaverConfig};
pub use validate::{validate_fit, validate_spec, ValidationError};
