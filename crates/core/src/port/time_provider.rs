// Time Provider Port (for testability)

/// Time provider interface (allows mocking in tests)
pub trait TimeProvider: Send + Sync {
    /// Get current time in milliseconds since epoch
    fn now_millis(&self) -> i64;
}

/// System time provider (production)
pub struct SystemTimeProvider;

impl TimeProvider for SystemTimeProvider {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::atomic::{AtomicI64, Ordering};

    /// Manually driven clock
    pub struct FixedTimeProvider {
        now: AtomicI64,
    }

    impl FixedTimeProvider {
        pub fn new(now_millis: i64) -> Self {
            Self {
                now: AtomicI64::new(now_millis),
            }
        }

        pub fn set(&self, now_millis: i64) {
            self.now.store(now_millis, Ordering::SeqCst);
        }

        pub fn advance(&self, millis: i64) {
            self.now.fetch_add(millis, Ordering::SeqCst);
        }
    }

    impl TimeProvider for FixedTimeProvider {
        fn now_millis(&self) -> i64 {
            self.now.load(Ordering::SeqCst)
        }
    }

    /// Wall clock anchored to tokio's clock
    ///
    /// Under `#[tokio::test(start_paused = true)]` it advances exactly as far
    /// as the runtime's virtual time does.
    pub struct TokioTimeProvider {
        base_millis: i64,
        origin: tokio::time::Instant,
    }

    impl TokioTimeProvider {
        pub fn new(base_millis: i64) -> Self {
            Self {
                base_millis,
                origin: tokio::time::Instant::now(),
            }
        }
    }

    impl TimeProvider for TokioTimeProvider {
        fn now_millis(&self) -> i64 {
            self.base_millis + self.origin.elapsed().as_millis() as i64
        }
    }
}
