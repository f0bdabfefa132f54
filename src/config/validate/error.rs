//! Validation error types
//!
//! Defines all validation error variants for harness specifications.

/// Validation error type
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid batch size: {0} (must be > 0)")]
    InvalidBatchSize(usize),

    #[error("Invalid epochs: {0} (must be > 0)")]
    InvalidEpochs(usize),

    #[error("Saver basename must not be empty")]
    EmptyBasename,

    #[error("Invalid save interval: {0} (must be > 0)")]
    InvalidSaveInterval(usize),

    #[error("Saver extension must not be empty")]
    EmptyExtension,

    #[error("Invalid embed size: {0} (must be > 0)")]
    InvalidEmbedSize(usize),

    #[error("Unknown token must not be empty")]
    EmptyUnknownToken,

    #[error("vocab_file requires embed_file")]
    VocabWithoutEmbeddings,
}
