use strum::{EnumIter, IntoEnumIterator};

/// Integer representation of a token in the vocabulary.
///
/// Ids are drawn from the closed range [`MIN_TOKEN_ID`]..=[`MAX_TOKEN_ID`].  Zero is never
/// assigned.
pub type TokenId = u32;

pub const MIN_TOKEN_ID: TokenId = 1;
pub const MAX_TOKEN_ID: TokenId = 9999;

/// Total number of distinct tokens, markers included, that a single vocabulary can ever hold.
pub const VOCABULARY_CAPACITY: usize = (MAX_TOKEN_ID - MIN_TOKEN_ID + 1) as usize;

/// The reserved marker tokens.
///
/// Markers are registered in every vocabulary before any text is seen, but their ids are minted
/// the same way as for any other token.  Declaration order is registration order.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, EnumIter)]
pub enum Marker {
    /// Padding
    Pad,
    /// Stand-in for ids that aren't in the vocabulary
    Unk,
    /// Start of a sequence
    Bos,
    /// End of a sequence
    Eos,
}

impl Marker {
    pub const fn as_str(self) -> &'static str {
        match self {
            Marker::Pad => "<PAD>",
            Marker::Unk => "<UNK>",
            Marker::Bos => "<BOS>",
            Marker::Eos => "<EOS>",
        }
    }

    /// The marker spelled exactly as `token`, if any
    pub fn from_token(token: &str) -> Option<Self> {
        Self::iter().find(|marker| marker.as_str() == token)
    }

    /// Markers that are dropped from decoded text.  `<UNK>` survives decoding so callers can see
    /// where unrecognized ids were.
    pub const fn is_elided_on_decode(self) -> bool {
        !matches!(self, Marker::Unk)
    }

    pub(crate) const fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for Marker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
