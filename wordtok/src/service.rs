//! The entry points shared by everything that serves requests.
use crate::error::InvalidInputSnafu;
use crate::ids::IdStrategy;
use crate::token::TokenId;
use crate::tokenizer::Tokenizer;
use crate::Result;
use snafu::OptionExt;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Handle to one shared tokenizer.
///
/// Construct it once at startup and hand clones to whatever serves requests; all clones see and
/// grow the same vocabulary.  Every operation holds an internal lock for its whole duration, so
/// two concurrent requests that both introduce the same new token always agree on its id.
#[derive(Clone, Debug)]
pub struct Service {
    tokenizer: Arc<Mutex<Tokenizer>>,
}

impl Service {
    pub fn new(strategy: IdStrategy) -> Self {
        Self {
            tokenizer: Arc::new(Mutex::new(Tokenizer::new(strategy))),
        }
    }

    /// Encode a dynamically typed argument, which must be a JSON string.
    pub fn encode(&self, input: &serde_json::Value) -> Result<Vec<TokenId>> {
        let text = input.as_str().context(InvalidInputSnafu {
            message: "Input must be a string",
        })?;

        self.encode_text(text)
    }

    /// Decode a dynamically typed argument, which must be a JSON array.
    ///
    /// Elements are matched the way a JavaScript property key would be: an integer, a string
    /// holding exactly the decimal form of an integer (`"5"` but not `"05"`), or a one-element
    /// array of either.  Anything else can't be the id of anything, so it decodes to `<UNK>`.
    pub fn decode(&self, input: &serde_json::Value) -> Result<String> {
        let values = input.as_array().context(InvalidInputSnafu {
            message: "Input must be an array of token IDs",
        })?;

        let ids: Vec<i64> = values
            .iter()
            .map(|value| id_from_json(value).unwrap_or(NOT_AN_ID))
            .collect();

        Ok(self.decode_ids(&ids))
    }

    /// Learn every token in `text`, then encode it.
    pub fn encode_text(&self, text: &str) -> Result<Vec<TokenId>> {
        let mut tokenizer = self.tokenizer();

        tokenizer.learn_vocab_from_text(text)?;
        tokenizer.encode(text)
    }

    pub fn decode_ids(&self, ids: &[i64]) -> String {
        self.tokenizer().decode(ids)
    }

    /// Copy of the current token to id mapping
    pub fn vocabulary(&self) -> HashMap<String, TokenId> {
        self.tokenizer().vocabulary().snapshot()
    }

    fn tokenizer(&self) -> MutexGuard<'_, Tokenizer> {
        // The vocabulary is only mutated through `add_token`, which leaves it consistent even if
        // the thread holding the lock panics afterwards
        self.tokenizer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Zero is outside the id space, so it always decodes to `<UNK>`
const NOT_AN_ID: i64 = 0;

fn id_from_json(value: &serde_json::Value) -> Option<i64> {
    use serde_json::Value;

    match value {
        Value::Number(number) => number.as_i64().or_else(|| {
            number
                .as_f64()
                .filter(|float| float.fract() == 0.0 && float.abs() < i64::MAX as f64)
                .map(|float| float as i64)
        }),
        Value::String(key) => key.parse::<i64>().ok().filter(|id| id.to_string() == *key),
        // `[x]` stringifies to the same key as `x`
        Value::Array(items) if items.len() == 1 => id_from_json(&items[0]),
        _ => None,
    }
}
