// Countdown constants
use std::time::Duration;

/// Cadence of the recompute-and-render step (1s)
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Bounds accepted for a configured tick interval
pub const MIN_TICK_INTERVAL: Duration = Duration::from_millis(10);
pub const MAX_TICK_INTERVAL: Duration = Duration::from_secs(3600);
