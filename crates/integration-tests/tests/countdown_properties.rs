//! Countdown timer behaviour end to end
//!
//! Runs the real tick schedule on tokio's paused clock, so one virtual second
//! per tick without any wall-clock waiting.

use std::sync::Arc;
use std::time::Duration;

use promo_countdown_core::application::{CountdownTimer, TimerConfig, TimerOutcome};
use promo_countdown_core::domain::{Deadline, ExpiryDisplay, Frame};
use promo_countdown_core::port::render_target::mocks::RecordingRenderTarget;
use promo_countdown_core::port::time_provider::mocks::TokioTimeProvider;
use promo_countdown_core::CountdownError;
use tokio_test::{assert_err, assert_ok};

const NOW: i64 = 1_700_000_000_000;

fn start(
    offset_millis: i64,
    target: &RecordingRenderTarget,
    config: TimerConfig,
) -> Result<CountdownTimer, CountdownError> {
    let deadline = Deadline::from_millis(NOW + offset_millis)?;
    CountdownTimer::start(
        deadline,
        Arc::new(target.clone()),
        Arc::new(TokioTimeProvider::new(NOW)),
        config,
    )
}

fn total_seconds(frame: &Frame) -> i64 {
    let field = |s: &str| s.parse::<i64>().unwrap();
    field(&frame.days) * 86_400
        + field(&frame.hours) * 3_600
        + field(&frame.minutes) * 60
        + field(&frame.seconds)
}

/// Deadline three seconds out: renders at 0s, 1s, 2s, 3s and then nothing
#[tokio::test(start_paused = true)]
async fn test_termination_after_deadline() {
    let target = RecordingRenderTarget::new();
    let timer = assert_ok!(start(3_000, &target, TimerConfig::default()));

    let outcome = assert_ok!(timer.join().await);
    assert_eq!(outcome, TimerOutcome::Expired { ticks: 4 });
    assert_eq!(target.render_count(), 4);

    // Nothing else is scheduled
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(target.render_count(), 4);
    assert_eq!(
        target.last_frame().map(|f| f.to_string()),
        Some("0d 00:00:00".to_string())
    );
}

/// The first frame exists before the first scheduled tick
#[tokio::test(start_paused = true)]
async fn test_immediate_render_on_construction() {
    let target = RecordingRenderTarget::new();
    let timer = assert_ok!(start(10_000, &target, TimerConfig::default()));

    assert_eq!(target.render_count(), 1);
    assert_eq!(timer.ticks(), 1);
    assert_eq!(
        target.last_frame().map(|f| f.to_string()),
        Some("0d 00:00:10".to_string())
    );
    assert!(timer.is_running());

    timer.stop();
}

/// A deadline five seconds in the past renders one clamped frame only
#[tokio::test(start_paused = true)]
async fn test_past_deadline_renders_once() {
    let target = RecordingRenderTarget::new();
    let mut timer = assert_ok!(start(-5_000, &target, TimerConfig::default()));

    assert!(!timer.is_running());
    assert_eq!(
        assert_ok!(timer.wait().await),
        TimerOutcome::Expired { ticks: 1 }
    );

    tokio::time::sleep(Duration::from_secs(10)).await;
    let frames = target.frames();
    assert_eq!(frames.len(), 1);
    assert!(total_seconds(&frames[0]) <= 0);
    assert_eq!(frames[0].to_string(), "0d 00:00:00");
}

/// Sixty-five seconds out: one frame per second, never counting up
#[tokio::test(start_paused = true)]
async fn test_monotonic_countdown_over_65_seconds() {
    let target = RecordingRenderTarget::new();
    let timer = assert_ok!(start(65_000, &target, TimerConfig::default()));

    let outcome = assert_ok!(timer.join().await);
    assert!(
        (65..=66).contains(&outcome.ticks()),
        "expired after {} ticks",
        outcome.ticks()
    );

    let seconds: Vec<i64> = target.frames().iter().map(total_seconds).collect();
    assert_eq!(seconds.first(), Some(&65));
    assert_eq!(seconds.last(), Some(&0));
    assert!(seconds.windows(2).all(|pair| pair[1] <= pair[0]));
    // One second per tick on the virtual clock
    assert!(seconds.windows(2).all(|pair| pair[0] - pair[1] == 1));
}

/// Stop mid-schedule: no render after stop() returns
#[tokio::test(start_paused = true)]
async fn test_stop_cancels_remaining_ticks() {
    let target = RecordingRenderTarget::new();
    let mut timer = assert_ok!(start(60_000, &target, TimerConfig::default()));

    tokio::time::sleep(Duration::from_millis(4_500)).await;
    timer.stop();
    let rendered = target.render_count();
    assert_eq!(rendered, 5);

    assert_eq!(
        assert_ok!(timer.wait().await),
        TimerOutcome::Cancelled { ticks: 5 }
    );
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(target.render_count(), rendered);

    // Idempotent
    timer.stop();
    assert!(!timer.is_running());
}

/// Faster tick interval still ends on the zero frame
#[tokio::test(start_paused = true)]
async fn test_custom_tick_interval() {
    let target = RecordingRenderTarget::new();
    let config = TimerConfig {
        tick_interval: Duration::from_millis(250),
        ..TimerConfig::default()
    };
    let timer = assert_ok!(start(1_000, &target, config));

    assert_eq!(
        assert_ok!(timer.join().await),
        TimerOutcome::Expired { ticks: 5 }
    );
    let seconds: Vec<String> = target.frames().into_iter().map(|f| f.seconds).collect();
    assert_eq!(seconds, vec!["01", "00", "00", "00", "00"]);
}

/// Floor-division display of the final frame
#[tokio::test(start_paused = true)]
async fn test_floored_expiry_display() {
    let target = RecordingRenderTarget::new();
    let config = TimerConfig {
        tick_interval: Duration::from_millis(400),
        expiry_display: ExpiryDisplay::Floored,
    };
    let timer = assert_ok!(start(1_000, &target, config));

    // Ticks at 0, 400, 800, 1200ms: the last one is 200ms past the deadline
    assert_eq!(
        assert_ok!(timer.join().await),
        TimerOutcome::Expired { ticks: 4 }
    );
    assert_eq!(
        target.last_frame().map(|f| f.to_string()),
        Some("-1d -1:-1:-1".to_string())
    );
}

/// Construction errors are synchronous and leave nothing rendered
#[tokio::test(start_paused = true)]
async fn test_construction_errors() {
    let target = RecordingRenderTarget::new();
    let result = CountdownTimer::create(
        "next tuesday-ish",
        Arc::new(target.clone()),
        Arc::new(TokioTimeProvider::new(NOW)),
    );
    assert!(matches!(assert_err!(result), CountdownError::InvalidDeadline(_)));
    assert_eq!(target.render_count(), 0);

    let config = TimerConfig {
        tick_interval: Duration::ZERO,
        ..TimerConfig::default()
    };
    assert!(matches!(
        assert_err!(start(1_000, &target, config)),
        CountdownError::Config(_)
    ));
    assert_eq!(target.render_count(), 0);
}

/// A write failure after construction cancels the schedule
#[tokio::test(start_paused = true)]
async fn test_render_failure_surfaces_target_lost() {
    let target = RecordingRenderTarget::failing_after(3);
    let timer = assert_ok!(start(60_000, &target, TimerConfig::default()));

    let err = assert_err!(timer.join().await);
    assert!(matches!(err, CountdownError::RenderTargetLost(_)));
    assert_eq!(target.render_count(), 3);
}
