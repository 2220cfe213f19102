// Domain Layer - Pure countdown values, no I/O

pub mod deadline;
pub mod error;
pub mod frame;
pub mod remaining;

// Re-exports
pub use deadline::Deadline;
pub use error::DomainError;
pub use frame::{Frame, Slot};
pub use remaining::{ExpiryDisplay, TimeRemaining};
