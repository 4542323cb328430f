/// Errors raised while playing a puzzle. Most are recoverable rejections that the
/// player sees as a short notice; `Data` means the catalog itself is broken.
use thiserror::Error;

/// DataIntegrityError means a puzzle record can't be played. It is never retried.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("puzzle {puzzle_id} is malformed: {reason}")]
pub struct DataIntegrityError {
    pub puzzle_id: u32,
    pub reason: String,
}

impl DataIntegrityError {
    pub fn new(puzzle_id: u32, reason: impl Into<String>) -> DataIntegrityError {
        DataIntegrityError {
            puzzle_id,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PlayError {
    #[error("Your guess must be {expected} letters long")]
    InputLength { expected: usize, actual: usize },

    #[error("Not in word list")]
    WordNotFound(String),

    // Same notice as WordNotFound, the reason only goes to the logs.
    #[error("Not in word list")]
    ValidatorUnavailable { word: String, reason: String },

    #[error("The game is over")]
    GameOver,

    #[error("Still checking your last guess")]
    Busy,

    #[error("The puzzle changed before your guess was checked")]
    Stale,

    #[error("Finish this puzzle first")]
    StillPlaying,

    #[error(transparent)]
    Data(#[from] DataIntegrityError),
}

impl PlayError {
    /// Fatal errors must stop the session instead of being shown as a notice.
    pub fn is_fatal(&self) -> bool {
        matches!(self, PlayError::Data(_))
    }
}
