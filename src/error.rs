/// Error taxonomy.
///
/// Only setup and resource failures travel through here. Gameplay
/// "failures" (a wrong guess, a lock-out) are state transitions.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TermlinkError {
    /// Word list missing, unreadable, or without a usable bucket.
    #[error("dictionary unavailable: {0}")]
    DictionaryUnavailable(String),

    /// A named screen template does not exist.
    #[error("template not found: {0}")]
    TemplateMissing(String),

    /// Guess references a word whose cells are all gone. Callers treat
    /// this as a no-op.
    #[error("word {0} has no remaining cells")]
    InvalidGuessTarget(usize),

    #[error("no candidate word of length {word_length} fits a grid of {capacity} cells")]
    NoCandidatePlaced { capacity: usize, word_length: usize },

    #[error("terminal i/o error: {0}")]
    Io(#[from] std::io::Error),
}
