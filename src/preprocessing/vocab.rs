//! Token ↔ id registry

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Vocabulary id type
pub type TokenId = u32;

/// Bidirectional token ↔ id mapping
///
/// [`Vocabulary::add`] assigns consecutive ids from 0 in first-insertion
/// order. Every id belongs to at most one token at any time. `TokenId::MAX`
/// is never assigned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<(String, TokenId)>", into = "Vec<(String, TokenId)>")]
pub struct Vocabulary {
    token_to_id: HashMap<String, TokenId>,
    id_to_token: HashMap<TokenId, String>,
    next_id: TokenId,
}

impl Vocabulary {
    /// Empty vocabulary
    pub fn new() -> Self {
        Self::default()
    }

    /// Vocabulary holding `tokens` in order; repeated tokens keep their first id
    pub fn from_tokens<I, S>(tokens: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut vocab = Self::new();
        for token in tokens {
            vocab.add(token)?;
        }
        Ok(vocab)
    }

    /// Id of `token`, inserting it with the next id if it is new
    ///
    /// Fails with [`Error::IdOutOfRange`] once every usable id is taken.
    pub fn add(&mut self, token: impl Into<String>) -> Result<TokenId> {
        let token = token.into();
        if let Some(&id) = self.token_to_id.get(&token) {
            return Ok(id);
        }
        let id = self.next_id;
        if id == TokenId::MAX {
            return Err(Error::IdOutOfRange(id));
        }
        self.next_id = id + 1;
        self.id_to_token.insert(id, token.clone());
        self.token_to_id.insert(token, id);
        Ok(id)
    }

    /// Id of `token`
    pub fn get(&self, token: &str) -> Option<TokenId> {
        self.token_to_id.get(token).copied()
    }

    /// Token bound to `id`
    pub fn lookup(&self, id: TokenId) -> Result<&str> {
        self.id_to_token.get(&id).map(String::as_str).ok_or(Error::UnknownId(id))
    }

    /// Bind `token` to an explicit `id`
    ///
    /// Fails if `id` already belongs to a different token or is
    /// `TokenId::MAX`. Rebinding a token releases its previous id. Later
    /// [`Vocabulary::add`] calls continue after the largest id seen.
    pub fn set(&mut self, token: impl Into<String>, id: TokenId) -> Result<()> {
        if id == TokenId::MAX {
            return Err(Error::IdOutOfRange(id));
        }
        let token = token.into();
        if let Some(existing) = self.id_to_token.get(&id) {
            if *existing != token {
                return Err(Error::IdCollision { id, existing: existing.clone(), token });
            }
        }
        if let Some(previous) = self.token_to_id.insert(token.clone(), id) {
            self.id_to_token.remove(&previous);
        }
        self.id_to_token.insert(id, token);
        self.next_id = self.next_id.max(id + 1);
        Ok(())
    }

    /// Remove `token`, returning the id it had
    pub fn remove(&mut self, token: &str) -> Option<TokenId> {
        let id = self.token_to_id.remove(token)?;
        self.id_to_token.remove(&id);
        Some(id)
    }

    /// Remove every token and restart ids at 0
    pub fn clear(&mut self) {
        self.token_to_id.clear();
        self.id_to_token.clear();
        self.next_id = 0;
    }

    /// Whether `token` is present
    pub fn contains_token(&self, token: &str) -> bool {
        self.token_to_id.contains_key(token)
    }

    /// Whether `id` is bound
    pub fn contains_id(&self, id: TokenId) -> bool {
        self.id_to_token.contains_key(&id)
    }

    /// Number of tokens
    pub fn len(&self) -> usize {
        self.token_to_id.len()
    }

    /// Whether the vocabulary is empty
    pub fn is_empty(&self) -> bool {
        self.token_to_id.is_empty()
    }

    /// Id the next new token will get
    pub fn next_id(&self) -> TokenId {
        self.next_id
    }

    /// `(token, id)` pairs in id order
    pub fn iter(&self) -> impl Iterator<Item = (&str, TokenId)> + '_ {
        let mut pairs: Vec<(&str, TokenId)> =
            self.token_to_id.iter().map(|(token, &id)| (token.as_str(), id)).collect();
        pairs.sort_unstable_by_key(|&(_, id)| id);
        pairs.into_iter()
    }

    /// Tokens in id order
    pub fn tokens(&self) -> Vec<&str> {
        self.iter().map(|(token, _)| token).collect()
    }
}

impl TryFrom<Vec<(String, TokenId)>> for Vocabulary {
    type Error = Error;

    /// Rebuild from `(token, id)` pairs; an id bound to two tokens is rejected
    fn try_from(pairs: Vec<(String, TokenId)>) -> Result<Self> {
        let mut vocab = Self::new();
        for (token, id) in pairs {
            vocab.set(token, id)?;
        }
        Ok(vocab)
    }
}

impl From<Vocabulary> for Vec<(String, TokenId)> {
    fn from(vocab: Vocabulary) -> Self {
        let mut pairs: Vec<(String, TokenId)> = vocab.token_to_id.into_iter().collect();
        pairs.sort_unstable_by_key(|&(_, id)| id);
        pairs
    }
}
