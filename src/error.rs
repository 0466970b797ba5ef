use thiserror::Error;

use crate::store::StoreError;

pub type JournalResult<T> = core::result::Result<T, JournalError>;

#[derive(Debug, Error)]
pub enum JournalError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Question not found: {0}")]
    QuestionNotFound(String),
    #[error("Challenge not found: {0}")]
    ChallengeNotFound(String),
    #[error("Invalid time '{0}': expected HH:MM")]
    InvalidTime(String),
}
