use thiserror::Error;

/// Failure surfaced by booking operations.
///
/// `NotFound` and `Validation` carry the message shown to the caller.
/// Store failures are wrapped as-is and never retried.
#[derive(Debug, Error)]
pub enum BookingError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Infrastructure(#[from] anyhow::Error),
}

impl BookingError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

pub type BookingResult<T> = Result<T, BookingError>;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown booking status '{0}'")]
pub struct UnknownStatus(pub String);
