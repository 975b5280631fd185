//! The vocabulary: a bijection between token strings and integer ids that only ever grows.
use crate::error::VocabularyFullSnafu;
use crate::ids::{IdAllocator, IdStrategy};
use crate::token::{Marker, TokenId, VOCABULARY_CAPACITY};
use crate::Result;
use snafu::ensure;
use strum::IntoEnumIterator;
use tracing::*;

pub use rustc_hash::FxHashMap as HashMap;

/// Mapping from token strings to ids, and back again.
///
/// Every known token has exactly one id and every assigned id maps back to exactly one token.
/// Nothing is ever removed, so once a token has an id it keeps it for the lifetime of the
/// vocabulary.
///
/// The id space holds [`VOCABULARY_CAPACITY`] ids.  That is a hard limit on the number of distinct
/// tokens, including the four markers, that one vocabulary can learn.  Past that point
/// [`Vocabulary::add_token`] fails for any new token.
pub struct Vocabulary {
    encode: HashMap<String, TokenId>,
    decode: HashMap<TokenId, String>,
    markers: [TokenId; 4],
    ids: IdAllocator,
}

impl Vocabulary {
    /// Create a vocabulary containing only the marker tokens.
    pub fn new(strategy: IdStrategy) -> Self {
        let mut vocab = Self {
            encode: HashMap::default(),
            decode: HashMap::default(),
            markers: [0; 4],
            ids: IdAllocator::new(strategy),
        };

        for marker in Marker::iter() {
            let id = vocab.bind(marker.as_str().to_owned());
            vocab.markers[marker.index()] = id;
        }

        vocab
    }

    /// Add `token` if it isn't known yet, returning its id either way.
    pub fn add_token(&mut self, token: &str) -> Result<TokenId> {
        if let Some(id) = self.lookup(token) {
            return Ok(id);
        }

        ensure!(
            !self.is_full(),
            VocabularyFullSnafu {
                capacity: VOCABULARY_CAPACITY
            }
        );

        let id = self.bind(token.to_owned());
        debug!(token, id, "Learned new token");

        Ok(id)
    }

    pub fn lookup(&self, token: &str) -> Option<TokenId> {
        self.encode.get(token).copied()
    }

    pub fn reverse_lookup(&self, id: TokenId) -> Option<&str> {
        self.decode.get(&id).map(String::as_str)
    }

    /// The id of one of the reserved markers.  Markers are always present.
    pub fn marker_id(&self, marker: Marker) -> TokenId {
        self.markers[marker.index()]
    }

    /// Copy of the token to id mapping.  Changes to the copy have no effect on the vocabulary.
    pub fn snapshot(&self) -> std::collections::HashMap<String, TokenId> {
        self.encode
            .iter()
            .map(|(token, id)| (token.clone(), *id))
            .collect()
    }

    /// Number of distinct tokens, markers included
    pub fn len(&self) -> usize {
        self.encode.len()
    }

    pub fn is_empty(&self) -> bool {
        self.encode.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.decode.len() >= VOCABULARY_CAPACITY
    }

    /// Assign a fresh id to a token that is known not to be present yet.
    ///
    /// Callers must check [`Self::is_full`] first.
    fn bind(&mut self, token: String) -> TokenId {
        let decode = &self.decode;
        let id = self.ids.next_id(|candidate| decode.contains_key(&candidate));

        self.decode.insert(id, token.clone());
        self.encode.insert(token, id);

        id
    }
}

impl std::fmt::Debug for Vocabulary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Vocabulary")
            .field("len", &self.len())
            .field("markers", &self.markers)
            .finish()
    }
}
