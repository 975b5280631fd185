//! A whitespace tokenizer that learns its vocabulary from the text it is given.
//!
//! Text is split on runs of whitespace, and every token that hasn't been seen before is given a
//! new integer id on the spot.  Four reserved markers (`<PAD>`, `<UNK>`, `<BOS>`, `<EOS>`) are
//! present in every vocabulary from the start.
//!
//! Most callers want [`Service`], which wraps a single shared [`Tokenizer`] and exposes the
//! `encode`/`decode` entry points.
mod error;
mod ids;
mod service;
mod token;
mod tokenizer;
mod vocab;

pub use error::*;
pub use ids::IdStrategy;
pub use service::Service;
pub use token::*;
pub use tokenizer::{is_separator, split_tokens, Tokenizer};
pub use vocab::Vocabulary;

pub type Result<T> = std::result::Result<T, WordtokError>;
