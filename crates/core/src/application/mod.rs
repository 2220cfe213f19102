// Application Layer - Use Cases

pub mod countdown;

// Re-exports
pub use countdown::{CountdownTimer, TimerConfig, TimerOutcome};
