//! Configuration validation logic
//!
//! Checks numeric ranges and required fields before anything is built.

use super::error::ValidationError;
use crate::config::schema::{FitOptions, HarnessSpec, PreprocessorConfig, SaverConfig};

/// Validate a harness specification
pub fn validate_spec(spec: &HarnessSpec) -> Result<(), ValidationError> {
    validate_fit(&spec.fit)?;
    if let Some(saver) = &spec.saver {
        validate_saver(saver)?;
    }
    if let Some(preprocessor) = &spec.preprocessor {
        validate_preprocessor(preprocessor)?;
    }
    Ok(())
}

/// Validate fit options
pub fn validate_fit(fit: &FitOptions) -> Result<(), ValidationError> {
    if fit.batch_size == 0 {
        return Err(ValidationError::InvalidBatchSize(fit.batch_size));
    }
    if fit.epochs == 0 {
        return Err(ValidationError::InvalidEpochs(fit.epochs));
    }
    Ok(())
}

fn validate_saver(saver: &SaverConfig) -> Result<(), ValidationError> {
    if saver.basename.trim().is_empty() {
        return Err(ValidationError::EmptyBasename);
    }
    if saver.interval == 0 {
        return Err(ValidationError::InvalidSaveInterval(saver.interval));
    }
    if saver.extension.is_empty() {
        return Err(ValidationError::EmptyExtension);
    }
    Ok(())
}

fn validate_preprocessor(config: &PreprocessorConfig) -> Result<(), ValidationError> {
    // The dimensionality comes from the file when one is given.
    if config.embed_file.is_none() {
        if config.embed_size == 0 {
            return Err(ValidationError::InvalidEmbedSize(config.embed_size));
        }
        if config.vocab_file.is_some() {
            return Err(ValidationError::VocabWithoutEmbeddings);
        }
    }
    if config.unknown.is_empty() {
        return Err(ValidationError::EmptyUnknownToken);
    }
    Ok(())
}
