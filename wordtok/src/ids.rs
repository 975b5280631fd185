//! Minting of new token ids.
//!
//! A vocabulary never frees an id, so the only thing an allocator has to know about existing
//! assignments is whether a candidate is already taken.
use crate::token::{TokenId, MAX_TOKEN_ID, MIN_TOKEN_ID};
use rand::{rngs::StdRng, Rng, SeedableRng};
use strum::EnumString;

/// How new tokens get their ids.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, EnumString, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum IdStrategy {
    /// Sample uniformly from the id space, retrying until an unused id comes up.
    ///
    /// Ids carry no information about when a token was first seen.  The cost is that retries get
    /// more frequent as the vocabulary fills up.
    #[default]
    Random,

    /// Hand out ids in increasing order, starting at [`MIN_TOKEN_ID`].
    Sequential,
}

pub(crate) enum IdAllocator {
    Random(StdRng),
    Sequential { last: TokenId },
}

impl IdAllocator {
    pub(crate) fn new(strategy: IdStrategy) -> Self {
        match strategy {
            IdStrategy::Random => IdAllocator::Random(StdRng::from_entropy()),
            IdStrategy::Sequential => IdAllocator::Sequential {
                last: MIN_TOKEN_ID - 1,
            },
        }
    }

    /// Pick an id for which `is_taken` is false.
    ///
    /// The caller must make sure at least one id is still free, otherwise this never returns.
    pub(crate) fn next_id(&mut self, is_taken: impl Fn(TokenId) -> bool) -> TokenId {
        match self {
            IdAllocator::Random(rng) => loop {
                let candidate = rng.gen_range(MIN_TOKEN_ID..=MAX_TOKEN_ID);
                if !is_taken(candidate) {
                    break candidate;
                }
            },
            IdAllocator::Sequential { last } => {
                // Wrap around so ids bound by some other means don't strand the free ones below
                let mut candidate = *last;
                loop {
                    candidate = if candidate >= MAX_TOKEN_ID {
                        MIN_TOKEN_ID
                    } else {
                        candidate + 1
                    };
                    if !is_taken(candidate) {
                        *last = candidate;
                        break candidate;
                    }
                }
            }
        }
    }
}
