// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid deadline: {0}")]
    InvalidDeadline(String),

    #[error("Deadline out of range: {0}")]
    DeadlineOutOfRange(i64),
}

pub type Result<T> = std::result::Result<T, DomainError>;
