//! Error types with actionable diagnostics.
//!
//! Every fallible operation in the crate returns [`Result`]. Errors fall into
//! three groups:
//! - configuration errors (bad validation data, bad embedding dimension,
//!   duplicate callback names, id collisions) raised at the call that
//!   introduced them
//! - capacity errors (a document longer than the requested sequence length)
//!   that fail a single transform call
//! - lookup errors (an id that is not in the vocabulary)

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for ensayo operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the training harness and the preprocessing pipeline.
#[derive(Error, Debug)]
pub enum Error {
    /// `validation_data` did not contain exactly `(x_val, y_val)`.
    #[error(
        "When passing validation_data, it must contain 2 (x_val, y_val) items, \
         however it contains {len} items"
    )]
    InvalidValidationData { len: usize },

    /// A callback with the same name is already attached.
    #[error("Callback '{name}' is already attached\n  → Pass update = true to replace it")]
    DuplicateCallback { name: String },

    /// No callback with the given name is attached.
    #[error("No callback named '{name}' is attached")]
    UnknownCallback { name: String },

    /// An id is already bound to a different token.
    #[error("Id {id} has already been assigned to '{existing}', cannot assign it to '{token}'")]
    IdCollision { id: u32, existing: String, token: String },

    /// An id outside the assignable range (the largest id is reserved).
    #[error("Vocabulary id {0} is out of range, ids must be below {max}", max = u32::MAX)]
    IdOutOfRange(u32),

    /// Reverse lookup of an id that is not in the vocabulary.
    #[error("Unknown vocabulary id: {0}")]
    UnknownId(u32),

    /// A document has more tokens than the requested fixed length.
    #[error("Token length {length} exceeds the specified length value {limit}")]
    SequenceTooLong { length: usize, limit: usize },

    /// Embedding dimensionality must be positive.
    #[error("embed_size must be a positive integer value, got {0}")]
    InvalidEmbedSize(usize),

    /// An initializer produced a vector of the wrong size.
    #[error("Initializer produced a vector of length {found}, expected {expected}")]
    VectorLength { expected: usize, found: usize },

    /// Malformed pre-trained embedding file.
    #[error("Invalid embedding file {path} (line {line}): {message}")]
    EmbeddingFormat { path: PathBuf, line: usize, message: String },

    /// Dataset columns disagree on the number of samples.
    #[error("Dataset column {column} has {found} samples, expected {expected}")]
    ColumnLength { column: usize, expected: usize, found: usize },

    /// A dataset column has no sample axis.
    #[error("Dataset column {column} is a 0-dimensional array, expected a sample axis")]
    ScalarColumn { column: usize },

    /// Too few columns to split into inputs and targets.
    #[error("Dataset needs at least {required} columns, got {found}")]
    MissingColumns { required: usize, found: usize },

    /// Batch size must be positive.
    #[error("batch_size must be a positive integer value")]
    InvalidBatchSize,

    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// IO error with context.
    #[error("IO error: {context}\n  Cause: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Create an IO error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io { context: context.into(), source }
    }

    /// Whether the error was caused by caller input rather than the environment.
    pub fn is_user_error(&self) -> bool {
        !matches!(self, Self::Io { .. } | Self::Serialization(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Config(format!("Failed to parse YAML config: {err}"))
    }
}
