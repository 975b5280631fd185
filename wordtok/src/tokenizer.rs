//! Conversion between text and token id sequences.
use crate::ids::IdStrategy;
use crate::token::{Marker, TokenId};
use crate::vocab::Vocabulary;
use crate::Result;
use itertools::Itertools;

/// Whether `c` separates tokens.
///
/// This is the ECMAScript `\s` class (`WhiteSpace` plus `LineTerminator`), which differs from
/// [`char::is_whitespace`] in two places: U+0085 (NEL) is not a separator, U+FEFF (BOM) is.
pub fn is_separator(c: char) -> bool {
    match c {
        '\u{85}' => false,
        '\u{FEFF}' => true,
        c => c.is_whitespace(),
    }
}

/// Split `text` into tokens on runs of [separator](is_separator) characters.
///
/// Interior runs of any length act as a single separator, but a run at the very start or end of
/// the text still produces an empty token on that side.  An empty string is a single empty token.
/// No other normalization is done.
///
/// ```
/// # use wordtok::split_tokens;
/// assert_eq!(vec!["a", "b"], split_tokens("a \t b"));
/// assert_eq!(vec!["", "a", ""], split_tokens(" a\n"));
/// assert_eq!(vec![""], split_tokens(""));
/// ```
pub fn split_tokens(text: &str) -> Vec<&str> {
    let pieces: Vec<&str> = text.split(is_separator).collect();
    let last = pieces.len() - 1;

    pieces
        .into_iter()
        .enumerate()
        .filter(|(index, piece)| !piece.is_empty() || *index == 0 || *index == last)
        .map(|(_, piece)| piece)
        .collect()
}

/// Whitespace tokenizer whose vocabulary grows with every token it hasn't seen before.
///
/// Encoding never produces `<UNK>`: unknown tokens are learned on the spot.  Decoding is lossy
/// with respect to the original spacing, since tokens are always re-joined with a single space.
#[derive(Debug)]
pub struct Tokenizer {
    vocab: Vocabulary,
}

impl Tokenizer {
    pub fn new(strategy: IdStrategy) -> Self {
        Self {
            vocab: Vocabulary::new(strategy),
        }
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocab
    }

    /// Add every token in `text` to the vocabulary
    pub fn learn_vocab_from_text(&mut self, text: &str) -> Result<()> {
        for token in split_tokens(text) {
            self.vocab.add_token(token)?;
        }

        Ok(())
    }

    /// Encode `text` into ids, bracketed by the `<BOS>` and `<EOS>` marker ids.
    pub fn encode(&mut self, text: &str) -> Result<Vec<TokenId>> {
        let tokens = split_tokens(text);
        let mut ids = Vec::with_capacity(tokens.len() + 2);

        ids.push(self.vocab.marker_id(Marker::Bos));
        for token in tokens {
            ids.push(self.vocab.add_token(token)?);
        }
        ids.push(self.vocab.marker_id(Marker::Eos));

        Ok(ids)
    }

    /// Decode ids back into text.
    ///
    /// Ids that aren't in the vocabulary, including anything outside the id space, decode to
    /// `<UNK>`.  `<BOS>`, `<EOS>` and `<PAD>` are dropped wherever they occur.
    pub fn decode(&self, ids: &[i64]) -> String {
        ids.iter()
            .map(|&id| {
                TokenId::try_from(id)
                    .ok()
                    .and_then(|id| self.vocab.reverse_lookup(id))
                    .unwrap_or(Marker::Unk.as_str())
            })
            .filter(|token| !Marker::from_token(token).is_some_and(Marker::is_elided_on_decode))
            .join(" ")
    }
}
