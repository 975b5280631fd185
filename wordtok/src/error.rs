use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum WordtokError {
    #[snafu(display("{message}"))]
    InvalidInput { message: &'static str },

    #[snafu(display("Vocabulary is full: all {capacity} token ids are already assigned"))]
    VocabularyFull { capacity: usize },
}

/// Broad classification of [`WordtokError`], used by callers that need to decide whether the
/// caller or the tokenizer is at fault.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// The argument had the wrong type or shape
    InvalidInput,

    /// Something went wrong inside the vocabulary itself
    InternalError,
}

impl WordtokError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WordtokError::InvalidInput { .. } => ErrorKind::InvalidInput,
            WordtokError::VocabularyFull { .. } => ErrorKind::InternalError,
        }
    }
}
