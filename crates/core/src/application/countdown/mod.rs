// Countdown Timer - recompute-and-render loop against a fixed deadline

mod cancel;
pub mod constants;

pub use cancel::{cancel_channel, CancelSender, CancelToken};

use crate::domain::{Deadline, ExpiryDisplay, Frame, TimeRemaining};
use crate::error::{CountdownError, Result};
use crate::port::{RenderTarget, TimeProvider};
use constants::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info, Instrument};

/// Timer settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerConfig {
    pub tick_interval: Duration,
    pub expiry_display: ExpiryDisplay,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
            expiry_display: ExpiryDisplay::default(),
        }
    }
}

impl TimerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.tick_interval < MIN_TICK_INTERVAL || self.tick_interval > MAX_TICK_INTERVAL {
            return Err(CountdownError::Config(format!(
                "tick interval {:?} outside {:?}..={:?}",
                self.tick_interval, MIN_TICK_INTERVAL, MAX_TICK_INTERVAL
            )));
        }
        Ok(())
    }
}

/// How a finished schedule ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerOutcome {
    /// The deadline passed; `ticks` renders were made, the last one expired
    Expired { ticks: u64 },
    /// `stop()` was called (or the handle dropped) before expiry
    Cancelled { ticks: u64 },
}

impl TimerOutcome {
    pub fn ticks(&self) -> u64 {
        match self {
            TimerOutcome::Expired { ticks } | TimerOutcome::Cancelled { ticks } => *ticks,
        }
    }
}

/// Result of a single tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TickOutcome {
    Continue,
    Expired,
    Stopped,
}

#[derive(Debug, Default)]
struct TickState {
    stopped: bool,
    ticks: u64,
    last: Option<TimeRemaining>,
}

/// State shared between the handle and the tick loop
///
/// The gate is held across the stopped check and the render. `stop()` raises
/// `cancel_requested` before waiting on the gate, so a render in flight may
/// finish but no tick that takes the gate afterwards renders.
struct TimerCore {
    deadline: Deadline,
    target: Arc<dyn RenderTarget>,
    time_provider: Arc<dyn TimeProvider>,
    expiry_display: ExpiryDisplay,
    cancel_requested: AtomicBool,
    gate: Mutex<TickState>,
}

impl TimerCore {
    fn lock(&self) -> MutexGuard<'_, TickState> {
        // A poisoned gate only means a render panicked; the flag is still valid
        self.gate.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn tick(&self) -> Result<TickOutcome> {
        let mut state = self.lock();
        if state.stopped || self.cancel_requested.load(Ordering::SeqCst) {
            state.stopped = true;
            return Ok(TickOutcome::Stopped);
        }

        let now = self.time_provider.now_millis();
        let total_millis = self.deadline.remaining_millis(now);
        let remaining = self.expiry_display.decompose(total_millis);
        let frame = Frame::from(&remaining);

        if let Err(e) = self.target.render(&frame) {
            state.stopped = true;
            error!(error = %e, ticks = state.ticks, "Render failed, cancelling countdown");
            return Err(CountdownError::RenderTargetLost(e.to_string()));
        }

        state.ticks += 1;
        state.last = Some(remaining);
        debug!(
            ticks = state.ticks,
            total_millis = total_millis,
            frame = %frame,
            "Countdown tick rendered"
        );

        if remaining.is_expired() {
            state.stopped = true;
            info!(ticks = state.ticks, "Deadline reached, countdown stopped");
            return Ok(TickOutcome::Expired);
        }
        Ok(TickOutcome::Continue)
    }

    /// Returns true if this call performed the transition
    fn stop(&self) -> bool {
        self.cancel_requested.store(true, Ordering::SeqCst);
        let mut state = self.lock();
        !std::mem::replace(&mut state.stopped, true)
    }

    fn ticks(&self) -> u64 {
        self.lock().ticks
    }
}

/// Countdown timer bound to one deadline and one render target
///
/// Construction renders once synchronously; a tokio task then re-renders on
/// every tick until the deadline passes or `stop()` is called.
pub struct CountdownTimer {
    id: String,
    core: Arc<TimerCore>,
    cancel: CancelSender,
    schedule: Option<JoinHandle<Result<TimerOutcome>>>,
    finished: Option<Result<TimerOutcome>>,
}

impl std::fmt::Debug for CountdownTimer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CountdownTimer")
            .field("id", &self.id)
            .field("deadline", &self.core.deadline)
            .field("ticks", &self.core.ticks())
            .field("running", &self.is_running())
            .finish()
    }
}

impl CountdownTimer {
    /// Create a timer from a raw timestamp with default settings
    ///
    /// # Errors
    /// - `CountdownError::InvalidDeadline` if `deadline` cannot be parsed
    /// - `CountdownError::TargetNotFound` if the target has missing slots
    ///
    /// # Example
    /// ```text
    /// let timer = CountdownTimer::create(
    ///     "2030-01-01T00:00:00Z",
    ///     Arc::new(LogRenderTarget::new("promo")),
    ///     Arc::new(SystemTimeProvider),
    /// )?;
    /// timer.join().await?;
    /// ```
    pub fn create(
        deadline: &str,
        target: Arc<dyn RenderTarget>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Result<Self> {
        let deadline = Deadline::parse(deadline)?;
        Self::start(deadline, target, time_provider, TimerConfig::default())
    }

    /// Start a timer for an already parsed deadline
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(
        deadline: Deadline,
        target: Arc<dyn RenderTarget>,
        time_provider: Arc<dyn TimeProvider>,
        config: TimerConfig,
    ) -> Result<Self> {
        config.validate()?;
        target
            .resolve()
            .map_err(|e| CountdownError::TargetNotFound(e.to_string()))?;
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| CountdownError::Internal(format!("no tokio runtime: {}", e)))?;

        let id = uuid::Uuid::new_v4().to_string();
        let core = Arc::new(TimerCore {
            deadline,
            target,
            time_provider,
            expiry_display: config.expiry_display,
            cancel_requested: AtomicBool::new(false),
            gate: Mutex::new(TickState::default()),
        });
        let (cancel, token) = cancel_channel();

        info!(
            timer_id = %id,
            deadline = %deadline,
            deadline_ms = deadline.as_millis(),
            "Starting countdown"
        );

        // First render happens before the caller gets the handle
        let first = core.tick().map_err(|e| match e {
            CountdownError::RenderTargetLost(msg) => CountdownError::TargetNotFound(msg),
            other => other,
        })?;

        let mut finished = None;
        let schedule = match first {
            TickOutcome::Continue => {
                let span = tracing::info_span!("countdown", timer_id = %id);
                let first_tick_at = Instant::now() + config.tick_interval;
                let task =
                    run_schedule(Arc::clone(&core), first_tick_at, config.tick_interval, token);
                Some(runtime.spawn(task.instrument(span)))
            }
            TickOutcome::Expired | TickOutcome::Stopped => {
                finished = Some(Ok(TimerOutcome::Expired { ticks: core.ticks() }));
                None
            }
        };

        Ok(Self {
            id,
            core,
            cancel,
            schedule,
            finished,
        })
    }

    /// Cancel future ticks
    ///
    /// Idempotent. A tick already rendering may finish; no tick starts once
    /// this has been called, even while it waits for that render.
    pub fn stop(&self) {
        if self.core.stop() {
            info!(timer_id = %self.id, ticks = self.core.ticks(), "Countdown cancelled");
        }
        self.cancel.cancel();
    }

    pub fn is_running(&self) -> bool {
        !self.core.lock().stopped
    }

    /// Number of renders performed so far
    pub fn ticks(&self) -> u64 {
        self.core.ticks()
    }

    /// Components computed by the most recent tick
    pub fn last_remaining(&self) -> Option<TimeRemaining> {
        self.core.lock().last
    }

    pub fn deadline(&self) -> Deadline {
        self.core.deadline
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Wait for the schedule to end
    ///
    /// Cancel safe: dropping the future leaves the schedule running, and a
    /// later call picks up where this one left off.
    ///
    /// # Errors
    /// `CountdownError::RenderTargetLost` if a write failed mid-schedule.
    pub async fn wait(&mut self) -> Result<TimerOutcome> {
        if let Some(handle) = self.schedule.as_mut() {
            let result = match handle.await {
                Ok(result) => result,
                Err(join_err) => Err(CountdownError::Internal(format!(
                    "countdown task failed: {}",
                    join_err
                ))),
            };
            self.schedule = None;
            self.finished = Some(result);
        }

        match &self.finished {
            Some(result) => result.clone(),
            None => Err(CountdownError::Internal(
                "countdown has neither schedule nor outcome".to_string(),
            )),
        }
    }

    /// Wait for the schedule to end and release the timer
    pub async fn join(mut self) -> Result<TimerOutcome> {
        self.wait().await
    }
}

async fn run_schedule(
    core: Arc<TimerCore>,
    first_tick_at: Instant,
    period: Duration,
    mut token: CancelToken,
) -> Result<TimerOutcome> {
    // The construction render already covered t=0
    let mut ticker = interval_at(first_tick_at, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => {
                return Ok(TimerOutcome::Cancelled { ticks: core.ticks() });
            }
            _ = ticker.tick() => {
                match core.tick()? {
                    TickOutcome::Continue => {}
                    TickOutcome::Expired => {
                        return Ok(TimerOutcome::Expired { ticks: core.ticks() });
                    }
                    TickOutcome::Stopped => {
                        return Ok(TimerOutcome::Cancelled { ticks: core.ticks() });
                    }
                }
            }
        }
    }
}
