// Page adapter errors

use promo_countdown_core::domain::Slot;
use promo_countdown_core::CountdownError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PageError {
    #[error("Clock element not found: {0}")]
    ClockNotFound(String),

    #[error("Clock has no data-time attribute")]
    DeadlineMissing,

    #[error("Slot missing: {0}")]
    SlotMissing(Slot),

    #[error("Invalid selector: {0}")]
    Selector(String),
}

pub type Result<T> = std::result::Result<T, PageError>;

impl From<PageError> for CountdownError {
    fn from(err: PageError) -> Self {
        match err {
            PageError::ClockNotFound(_) | PageError::SlotMissing(_) => {
                CountdownError::TargetNotFound(err.to_string())
            }
            PageError::DeadlineMissing => CountdownError::InvalidDeadline(err.to_string()),
            PageError::Selector(msg) => CountdownError::Internal(msg),
        }
    }
}
