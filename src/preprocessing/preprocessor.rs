//! Text → id sequences, with a growing embedding table

use std::path::PathBuf;

use ndarray::{Array1, Array2};

use super::embeddings::load_embeddings;
use super::initializer::{Initializer, Uniform};
use super::normalize::{lowercase, replace_number, Normalizer};
use super::tokenizer::{Document, Tokenizer, WhitespaceTokenizer};
use super::vocab::{TokenId, Vocabulary};
use crate::config::PreprocessorConfig;
use crate::error::{Error, Result};

/// Sentinel filling fixed-length sequences; never a vocabulary id
pub const PAD_ID: i64 = -1;

/// Default unknown-token sentinel
pub const DEFAULT_UNKNOWN: &str = "<UNK>";

/// Builds vocabulary and embeddings from documents and maps documents to ids
///
/// The embedding matrix is index-aligned with the vocabulary. Vectors of
/// tokens added by [`Preprocessor::fit`] are buffered and merged into the
/// matrix by [`Preprocessor::get_embeddings`].
///
/// ```
/// use ensayo::preprocessing::{Preprocessor, PAD_ID};
///
/// let mut pre = Preprocessor::new(8).unwrap();
/// let ids = pre.fit_transform(&["the cat", "the dog"], Some(3)).unwrap();
/// assert_eq!(ids, vec![vec![1, 2, PAD_ID], vec![1, 3, PAD_ID]]);
/// assert_eq!(pre.get_embeddings().shape(), &[4, 8]);
/// ```
pub struct Preprocessor {
    vocabulary: Vocabulary,
    embeddings: Array2<f32>,
    pending: Vec<Array1<f32>>,
    embed_size: usize,
    unknown_id: TokenId,
    tokenizer: Box<dyn Tokenizer>,
    initializer: Box<dyn Initializer>,
    normalizer: Option<Normalizer>,
}

impl Preprocessor {
    /// Empty vocabulary with `embed_size`-dimensional vectors
    pub fn new(embed_size: usize) -> Result<Self> {
        Self::builder().embed_size(embed_size).build()
    }

    /// Vocabulary and vectors loaded from a pre-trained embedding file
    pub fn from_embeddings(embed_file: impl Into<PathBuf>) -> Result<Self> {
        Self::builder().embed_file(embed_file).build()
    }

    /// Configure a preprocessor step by step
    pub fn builder() -> PreprocessorBuilder {
        PreprocessorBuilder::default()
    }

    /// Preprocessor described by a `preprocessor:` config section
    pub fn from_config(config: &PreprocessorConfig) -> Result<Self> {
        let mut builder = Self::builder().embed_size(config.embed_size).unknown(config.unknown.clone());
        if let Some(embed_file) = &config.embed_file {
            builder = builder.embed_file(embed_file.clone());
        }
        if let Some(vocab_file) = &config.vocab_file {
            builder = builder.vocab_file(vocab_file.clone());
        }
        builder = if config.replace_numbers {
            builder.normalizer(replace_number)
        } else if config.lowercase {
            builder.normalizer(lowercase)
        } else {
            builder.without_normalizer()
        };
        builder.build()
    }

    /// Replace the token normalizer
    pub fn set_normalizer<F>(&mut self, normalizer: F)
    where
        F: Fn(&str) -> String + 'static,
    {
        self.normalizer = Some(Box::new(normalizer));
    }

    /// Use tokens exactly as the tokenizer produced them
    pub fn clear_normalizer(&mut self) {
        self.normalizer = None;
    }

    /// Add every token of every document to the vocabulary
    pub fn fit<I>(&mut self, documents: I) -> Result<&mut Self>
    where
        I: IntoIterator,
        I::Item: Document,
    {
        for document in documents {
            self.fit_one(&document)?;
        }
        Ok(self)
    }

    /// Add every token of one document to the vocabulary
    ///
    /// Tokens inserted before a failure stay in the vocabulary.
    pub fn fit_one<D: Document + ?Sized>(&mut self, document: &D) -> Result<&mut Self> {
        self.fit_tokens(self.extract_tokens(document, true))
    }

    /// [`Preprocessor::fit`] without the normalizer for this call
    pub fn fit_raw<I>(&mut self, documents: I) -> Result<&mut Self>
    where
        I: IntoIterator,
        I::Item: Document,
    {
        for document in documents {
            self.fit_one_raw(&document)?;
        }
        Ok(self)
    }

    /// [`Preprocessor::fit_one`] without the normalizer for this call
    pub fn fit_one_raw<D: Document + ?Sized>(&mut self, document: &D) -> Result<&mut Self> {
        self.fit_tokens(self.extract_tokens(document, false))
    }

    /// Map documents to id sequences
    ///
    /// With `length`, every sequence is padded with [`PAD_ID`] to exactly
    /// `length` ids and a longer document fails the whole call. Unknown
    /// tokens map to the unknown id.
    pub fn transform<I>(&self, documents: I, length: Option<usize>) -> Result<Vec<Vec<i64>>>
    where
        I: IntoIterator,
        I::Item: Document,
    {
        documents.into_iter().map(|document| self.transform_one(&document, length)).collect()
    }

    /// Map one document to an id sequence
    pub fn transform_one<D: Document + ?Sized>(
        &self,
        document: &D,
        length: Option<usize>,
    ) -> Result<Vec<i64>> {
        self.transform_tokens(&self.extract_tokens(document, true), length)
    }

    /// [`Preprocessor::transform`] without the normalizer for this call
    pub fn transform_raw<I>(&self, documents: I, length: Option<usize>) -> Result<Vec<Vec<i64>>>
    where
        I: IntoIterator,
        I::Item: Document,
    {
        documents.into_iter().map(|document| self.transform_one_raw(&document, length)).collect()
    }

    /// [`Preprocessor::transform_one`] without the normalizer for this call
    pub fn transform_one_raw<D: Document + ?Sized>(
        &self,
        document: &D,
        length: Option<usize>,
    ) -> Result<Vec<i64>> {
        self.transform_tokens(&self.extract_tokens(document, false), length)
    }

    fn transform_tokens(&self, tokens: &[String], length: Option<usize>) -> Result<Vec<i64>> {
        if let Some(limit) = length {
            if tokens.len() > limit {
                return Err(Error::SequenceTooLong { length: tokens.len(), limit });
            }
        }
        let ids =
            tokens.iter().map(|token| i64::from(self.vocabulary_id(token))).collect::<Vec<_>>();
        match length {
            Some(limit) => self.pad(&ids, limit),
            None => Ok(ids),
        }
    }

    /// `fit` followed by `transform` over the same documents
    pub fn fit_transform<D: Document>(
        &mut self,
        documents: &[D],
        length: Option<usize>,
    ) -> Result<Vec<Vec<i64>>> {
        self.fit(documents)?;
        self.transform(documents, length)
    }

    /// `fit_one` followed by `transform_one`
    pub fn fit_transform_one<D: Document + ?Sized>(
        &mut self,
        document: &D,
        length: Option<usize>,
    ) -> Result<Vec<i64>> {
        self.fit_one(document)?;
        self.transform_one(document, length)
    }

    /// Right-pad `ids` with [`PAD_ID`] to `length`
    pub fn pad(&self, ids: &[i64], length: usize) -> Result<Vec<i64>> {
        if ids.len() > length {
            return Err(Error::SequenceTooLong { length: ids.len(), limit: length });
        }
        let mut padded = Vec::with_capacity(length);
        padded.extend_from_slice(ids);
        padded.resize(length, PAD_ID);
        Ok(padded)
    }

    /// Embedding matrix, one row per vocabulary id
    ///
    /// Merges vectors buffered by `fit` first.
    pub fn get_embeddings(&mut self) -> &Array2<f32> {
        for row in self.pending.drain(..) {
            // Rows were checked against embed_size when they were buffered.
            if self.embeddings.push_row(row.view()).is_err() {
                break;
            }
        }
        &self.embeddings
    }

    /// Vectors buffered since the last `get_embeddings`
    pub fn pending_embeddings(&self) -> usize {
        self.pending.len()
    }

    /// Id of `token`, or the unknown id (no normalization applied)
    pub fn vocabulary_id(&self, token: &str) -> TokenId {
        self.vocabulary.get(token).unwrap_or(self.unknown_id)
    }

    /// Id of the unknown-token sentinel
    pub fn unknown_id(&self) -> TokenId {
        self.unknown_id
    }

    /// Padding sentinel
    pub fn pad_id(&self) -> i64 {
        PAD_ID
    }

    /// Vector dimensionality
    pub fn embed_size(&self) -> usize {
        self.embed_size
    }

    /// The vocabulary
    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    fn extract_tokens<D: Document + ?Sized>(&self, document: &D, normalize: bool) -> Vec<String> {
        let tokens = document.raw_tokens(self.tokenizer.as_ref());
        match &self.normalizer {
            Some(normalizer) if normalize => {
                tokens.iter().map(|token| normalizer(token.as_str())).collect()
            }
            _ => tokens,
        }
    }

    fn fit_tokens(&mut self, tokens: Vec<String>) -> Result<&mut Self> {
        for token in tokens {
            self.add_vocabulary(token, true)?;
        }
        Ok(self)
    }

    /// Existing id of `token`, or a new id with a fresh (or zero) vector
    fn add_vocabulary(&mut self, token: String, random: bool) -> Result<TokenId> {
        if let Some(id) = self.vocabulary.get(&token) {
            return Ok(id);
        }
        let vector = if random {
            self.initializer.initialize(self.embed_size)
        } else {
            Array1::zeros(self.embed_size)
        };
        if vector.len() != self.embed_size {
            return Err(Error::VectorLength { expected: self.embed_size, found: vector.len() });
        }
        let id = self.vocabulary.add(token)?;
        self.pending.push(vector);
        Ok(id)
    }
}

impl std::fmt::Debug for Preprocessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Preprocessor")
            .field("vocabulary", &self.vocabulary.len())
            .field("embed_size", &self.embed_size)
            .field("unknown_id", &self.unknown_id)
            .field("pending", &self.pending.len())
            .finish_non_exhaustive()
    }
}

/// Builder for [`Preprocessor`]
pub struct PreprocessorBuilder {
    embed_file: Option<PathBuf>,
    vocab_file: Option<PathBuf>,
    embed_size: usize,
    unknown: String,
    tokenizer: Box<dyn Tokenizer>,
    initializer: Option<Box<dyn Initializer>>,
    normalizer: Option<Normalizer>,
}

impl Default for PreprocessorBuilder {
    fn default() -> Self {
        Self {
            embed_file: None,
            vocab_file: None,
            embed_size: 50,
            unknown: DEFAULT_UNKNOWN.to_string(),
            tokenizer: Box::new(WhitespaceTokenizer),
            initializer: None,
            normalizer: Some(Box::new(lowercase)),
        }
    }
}

impl PreprocessorBuilder {
    /// Load vocabulary and vectors from this file
    pub fn embed_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.embed_file = Some(path.into());
        self
    }

    /// Take tokens from this file, aligned line by line with `embed_file`
    pub fn vocab_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.vocab_file = Some(path.into());
        self
    }

    /// Vector dimensionality when no embedding file is given
    pub fn embed_size(mut self, embed_size: usize) -> Self {
        self.embed_size = embed_size;
        self
    }

    /// Unknown-token sentinel
    pub fn unknown(mut self, unknown: impl Into<String>) -> Self {
        self.unknown = unknown.into();
        self
    }

    /// Tokenizer for text documents
    pub fn tokenizer<T: Tokenizer + 'static>(mut self, tokenizer: T) -> Self {
        self.tokenizer = Box::new(tokenizer);
        self
    }

    /// Vector initializer for new tokens (default: uniform in `[-1, 1]`)
    pub fn initializer<I: Initializer + 'static>(mut self, initializer: I) -> Self {
        self.initializer = Some(Box::new(initializer));
        self
    }

    /// Token normalizer (default: lowercase)
    pub fn normalizer<F>(mut self, normalizer: F) -> Self
    where
        F: Fn(&str) -> String + 'static,
    {
        self.normalizer = Some(Box::new(normalizer));
        self
    }

    /// Keep tokens unchanged
    pub fn without_normalizer(mut self) -> Self {
        self.normalizer = None;
        self
    }

    /// Build the preprocessor and register the unknown token
    pub fn build(self) -> Result<Preprocessor> {
        let (vocabulary, embeddings, embed_size) = match &self.embed_file {
            Some(embed_file) => {
                let (vocabulary, embeddings) =
                    load_embeddings(embed_file, self.vocab_file.as_deref())?;
                let embed_size = embeddings.ncols();
                (vocabulary, embeddings, embed_size)
            }
            None => {
                if self.vocab_file.is_some() {
                    return Err(Error::Config("vocab_file requires embed_file".to_string()));
                }
                if self.embed_size == 0 {
                    return Err(Error::InvalidEmbedSize(self.embed_size));
                }
                (Vocabulary::new(), Array2::zeros((0, self.embed_size)), self.embed_size)
            }
        };

        let initializer = match self.initializer {
            Some(initializer) => initializer,
            None => Box::new(Uniform::default()),
        };
        let mut preprocessor = Preprocessor {
            vocabulary,
            embeddings,
            pending: Vec::new(),
            embed_size,
            unknown_id: 0,
            tokenizer: self.tokenizer,
            initializer,
            normalizer: self.normalizer,
        };
        preprocessor.unknown_id = preprocessor.add_vocabulary(self.unknown, false)?;
        Ok(preprocessor)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        #[test]
        fn prop_embeddings_align_with_vocabulary(
            docs in proptest::collection::vec(proptest::collection::vec("[a-e]{1,3}", 0..6), 0..8),
            embed_size in 1usize..8,
        ) {
            let mut pre = Preprocessor::builder()
                .embed_size(embed_size)
                .initializer(Uniform::seeded(1.0, 9).unwrap())
                .build()
                .unwrap();
            pre.fit(&docs).unwrap();
            let rows = pre.get_embeddings().nrows();
            prop_assert_eq!(rows, pre.vocabulary().len());
            prop_assert_eq!(pre.get_embeddings().ncols(), embed_size);
        }

        #[test]
        fn prop_padded_sequences_have_requested_length(
            tokens in proptest::collection::vec("[a-z]{1,4}", 0..10),
            extra in 0usize..5,
        ) {
            let mut pre = Preprocessor::new(2).unwrap();
            let length = tokens.len() + extra;
            let ids = pre.fit_transform_one(&tokens, Some(length)).unwrap();
            prop_assert_eq!(ids.len(), length);
            prop_assert!(ids[tokens.len()..].iter().all(|&id| id == PAD_ID));
            prop_assert!(ids[..tokens.len()].iter().all(|&id| id > 0));
        }
    }
}
