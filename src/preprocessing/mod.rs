//! Text preprocessing
//!
//! - [`Vocabulary`]: bidirectional token ↔ id registry
//! - [`Preprocessor`]: tokenizes and normalizes documents, grows the
//!   vocabulary and an index-aligned embedding matrix, and maps documents to
//!   padded id sequences
//! - [`load_embeddings`]: reads pre-trained vectors from text files
//!
//! Documents are either raw text, split by a [`Tokenizer`], or sequences of
//! tokens used as-is (see [`Document`]).

mod embeddings;
mod initializer;
mod normalize;
mod preprocessor;
mod tokenizer;
mod vocab;

pub use embeddings::load_embeddings;
pub use initializer::{Initializer, Normal, Uniform, Zeros};
pub use normalize::{lowercase, replace_number, Normalizer, NUMBER_TOKEN};
pub use preprocessor::{Preprocessor, PreprocessorBuilder, DEFAULT_UNKNOWN, PAD_ID};
pub use tokenizer::{Document, Tokenizer, WhitespaceTokenizer};
pub use vocab::{TokenId, Vocabulary};
