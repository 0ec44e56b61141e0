use thiserror::Error;

use crate::store::StoreError;
use crate::timer::TimerError;

/// Application-specific error type
#[derive(Debug, Error)]
pub enum StudyError {
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Timer error: {0}")]
    Timer(#[from] TimerError),

    #[error("Invalid input: {0}")]
    Invalid(&'static str),
}

/// Convenience type alias for Result with StudyError
pub type Result<T> = std::result::Result<T, StudyError>;
