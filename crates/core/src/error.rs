// Central Error Type for the Countdown

use thiserror::Error;

/// Countdown error type
///
/// `InvalidDeadline` and `TargetNotFound` are raised while constructing a
/// timer; `RenderTargetLost` is raised by a running schedule.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CountdownError {
    #[error("Invalid deadline: {0}")]
    InvalidDeadline(String),

    #[error("Render target not found: {0}")]
    TargetNotFound(String),

    #[error("Render target lost: {0}")]
    RenderTargetLost(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using CountdownError
pub type Result<T> = std::result::Result<T, CountdownError>;

impl From<crate::domain::DomainError> for CountdownError {
    fn from(err: crate::domain::DomainError) -> Self {
        CountdownError::InvalidDeadline(err.to_string())
    }
}
