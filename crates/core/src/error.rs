// Central Error Type for the Application

use thiserror::Error;

use crate::domain::DomainError;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// True for failures the caller can surface as a message and move on
    /// (missing entry, empty queue, closed service, bad input)
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, AppError::Internal(_))
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
