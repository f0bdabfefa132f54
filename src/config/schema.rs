//! YAML schema definitions for declarative harness configuration

use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};

/// Deserialize a bool from either a YAML boolean (`true`) or a quoted string (`"true"`).
fn deserialize_bool_lenient<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolOrString {
        Bool(bool),
        Str(String),
    }

    match BoolOrString::deserialize(deserializer)? {
        BoolOrString::Bool(b) => Ok(b),
        BoolOrString::Str(s) => match s.to_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(serde::de::Error::custom(format!(
                "expected 'true' or 'false', got '{other}'"
            ))),
        },
    }
}

/// Options of one `Trainer::fit` call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FitOptions {
    /// Samples per batch
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Passes over the training data
    #[serde(default = "default_epochs")]
    pub epochs: usize,

    /// Draw a progress bar and log epoch summaries
    #[serde(default = "default_true", deserialize_with = "deserialize_bool_lenient")]
    pub verbose: bool,

    /// Seed for the shuffling RNG; `None` keeps the trainer's current RNG
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self { batch_size: default_batch_size(), epochs: default_epochs(), verbose: true, seed: None }
    }
}

impl FitOptions {
    /// Set batch size
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Set epoch count
    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    /// Enable or disable the default progress/logging observers
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Seed the shuffling RNG
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Checkpoint settings for a `Saver`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaverConfig {
    /// File stem; files are named `{basename}.{epoch}.{extension}`
    pub basename: String,

    /// Output directory
    #[serde(default = "default_directory")]
    pub directory: PathBuf,

    /// Save every N epochs
    #[serde(default = "default_interval")]
    pub interval: usize,

    /// File extension, without the dot
    #[serde(default = "default_extension")]
    pub extension: String,
}

/// Preprocessor settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreprocessorConfig {
    /// Pre-trained embedding file (tokens in the first column unless `vocab_file` is set)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embed_file: Option<PathBuf>,

    /// Vocabulary file aligned line by line with `embed_file`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vocab_file: Option<PathBuf>,

    /// Embedding dimensionality when no file is given
    #[serde(default = "default_embed_size")]
    pub embed_size: usize,

    /// Unknown-token sentinel
    #[serde(default = "default_unknown")]
    pub unknown: String,

    /// Lowercase tokens before lookup
    #[serde(default = "default_true", deserialize_with = "deserialize_bool_lenient")]
    pub lowercase: bool,

    /// Collapse numeric tokens into `<NUM>`
    #[serde(default, deserialize_with = "deserialize_bool_lenient")]
    pub replace_numbers: bool,
}

impl Default for PreprocessorConfig {
    fn default() -> Self {
        Self {
            embed_file: None,
            vocab_file: None,
            embed_size: default_embed_size(),
            unknown: default_unknown(),
            lowercase: true,
            replace_numbers: false,
        }
    }
}

/// Complete harness specification
///
/// ```yaml
/// fit:
///   batch_size: 16
///   epochs: 5
/// saver:
///   basename: mlp
///   directory: checkpoints
/// preprocessor:
///   embed_size: 100
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarnessSpec {
    /// Fit options
    #[serde(default)]
    pub fit: FitOptions,

    /// Optional checkpointing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saver: Option<SaverConfig>,

    /// Optional text preprocessing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preprocessor: Option<PreprocessorConfig>,
}

impl HarnessSpec {
    /// Parse and validate a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let spec: HarnessSpec = serde_yaml::from_str(yaml)?;
        spec.validate()?;
        Ok(spec)
    }

    /// Read, parse and validate a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| Error::io(format!("reading config {}", path.display()), e))?;
        Self::from_yaml_str(&yaml)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        super::validate::validate_spec(self).map_err(|e| Error::Config(format!("Invalid config: {e}")))
    }

    /// Serialize back to YAML
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

fn default_batch_size() -> usize {
    32
}

fn default_epochs() -> usize {
    10
}

fn default_true() -> bool {
    true
}

fn default_directory() -> PathBuf {
    PathBuf::from(".")
}

fn default_interval() -> usize {
    1
}

fn default_extension() -> String {
    "json".to_string()
}

fn default_embed_size() -> usize {
    50
}

fn default_unknown() -> String {
    "<UNK>".to_string()
}
