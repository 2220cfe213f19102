//! Promo Countdown - Main Entry Point
//! Binds a countdown to a promo page or the console and runs it to expiry

mod config;
mod telemetry;

use anyhow::{Context, Result};
use clap::Parser;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{AppConfig, DeadlineSource, Overrides, TargetKind, ENV_PREFIX};
use promo_countdown_core::application::{CountdownTimer, TimerOutcome};
use promo_countdown_core::domain::Deadline;
use promo_countdown_core::port::time_provider::SystemTimeProvider;
use promo_countdown_core::port::RenderTarget;
use promo_countdown_core::CountdownError;
use promo_countdown_infra_console::{LineMode, LogRenderTarget, TerminalRenderTarget};
use promo_countdown_infra_page::{PageRenderTarget, PromoPage};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const DEFAULT_LOG_FILTER: &str = "promo_countdown=info,promo_countdown_core=info,\
promo_countdown_infra_page=info,promo_countdown_infra_console=info";
const LOG_FILE_NAME: &str = "promo-countdown.log";
const DEFAULT_LOG_LABEL: &str = "promo";

#[derive(Parser)]
#[command(name = "promo-countdown")]
#[command(about = "Count down to a promo deadline", long_about = None)]
#[command(version)]
struct Cli {
    /// Deadline timestamp (RFC 3339, RFC 2822, ISO date or date-time)
    #[arg(short, long, conflicts_with = "page")]
    deadline: Option<String>,

    /// Promo page whose .promo__clock[data-time] holds the deadline
    #[arg(short, long, conflicts_with_all = ["target", "label"])]
    page: Option<String>,

    /// Render target when no page is given
    #[arg(short, long, value_parser = ["terminal", "log"])]
    target: Option<String>,

    /// Label shown before the countdown
    #[arg(short, long)]
    label: Option<String>,

    /// Disable colored terminal output
    #[arg(long)]
    no_color: bool,

    /// Tick interval in milliseconds
    #[arg(long)]
    tick_ms: Option<u64>,

    /// How the expired frame is shown
    #[arg(long, value_parser = ["zeroed", "floored"])]
    expiry_display: Option<String>,

    /// Config file (default: per-user config dir)
    #[arg(short, long, env = "PROMO_COUNTDOWN_CONFIG")]
    config: Option<PathBuf>,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            deadline: self.deadline.clone(),
            page: self.page.clone(),
            target: self.target.clone(),
            color: self.no_color.then_some(false),
            tick_ms: self.tick_ms,
            expiry_display: self.expiry_display.clone(),
            label: self.label.clone(),
        }
    }
}

/// Render target the countdown is bound to
enum Binding {
    Page(Arc<PageRenderTarget>),
    Console {
        target: Arc<dyn RenderTarget>,
        overwrite: bool,
    },
}

impl Binding {
    fn target(&self) -> Arc<dyn RenderTarget> {
        match self {
            Binding::Page(page) => page.clone(),
            Binding::Console { target, .. } => Arc::clone(target),
        }
    }

    /// Final output once the schedule has ended
    fn finish(&self) {
        match self {
            Binding::Page(page) => println!("{}", page.render_html()),
            Binding::Console {
                overwrite: true, ..
            } => println!(),
            Binding::Console { .. } => {}
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1. Initialize logging (stderr, so stdout carries only the countdown)
    let _log_guard = init_logging()?;
    info!("Promo Countdown v{} starting...", VERSION);

    // 2. Load configuration
    let config = AppConfig::load(cli.config.as_deref(), cli.overrides())?;

    // 3. Resolve deadline and render target
    let (deadline, binding) = bind(&config).await?;

    // 4. Start the countdown (renders once before returning)
    let mut timer = CountdownTimer::start(
        deadline,
        binding.target(),
        Arc::new(SystemTimeProvider),
        config.timer_config(),
    )?;
    info!(
        timer_id = %timer.id(),
        deadline = %deadline,
        "Countdown running. Press Ctrl+C to stop"
    );

    // 5. Wait for expiry or shutdown signal
    let outcome = tokio::select! {
        outcome = timer.wait() => outcome,
        signal = tokio::signal::ctrl_c() => match signal {
            Ok(()) => {
                info!("Shutdown signal received. Stopping countdown...");
                timer.stop();
                timer.wait().await
            }
            Err(e) => {
                warn!(error = %e, "Cannot listen for Ctrl+C, waiting for expiry");
                timer.wait().await
            }
        },
    };

    binding.finish();

    match outcome {
        Ok(TimerOutcome::Expired { ticks }) => info!(ticks = ticks, "Deadline reached"),
        Ok(TimerOutcome::Cancelled { ticks }) => info!(ticks = ticks, "Countdown cancelled"),
        Err(e) => {
            error!(error = %e, "Countdown failed");
            return Err(e.into());
        }
    }

    info!("Shutdown complete.");
    Ok(())
}

/// Install the tracing subscriber
///
/// `PROMO_COUNTDOWN_LOG_FORMAT=json` switches to JSON lines;
/// `PROMO_COUNTDOWN_LOG_DIR` adds a daily rolling log file.
fn init_logging() -> Result<Option<WorkerGuard>> {
    let log_format =
        std::env::var(format!("{}_LOG_FORMAT", ENV_PREFIX)).unwrap_or_else(|_| "pretty".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_LOG_FILTER))
        .context("Failed to create env filter")?;

    let otel_endpoint = telemetry::endpoint();
    let otel_layer = match &otel_endpoint {
        Some(endpoint) => telemetry::layer(endpoint).context("Failed to build OpenTelemetry layer")?,
        None => None,
    };
    let otel_missing = otel_endpoint.is_some() && otel_layer.is_none();

    let (file_layer, guard) = match std::env::var(format!("{}_LOG_DIR", ENV_PREFIX)) {
        Ok(dir) => {
            let dir = shellexpand::tilde(&dir).into_owned();
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_NAME);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_writer(writer).with_ansi(false)),
                Some(guard),
            )
        }
        Err(_) => (None, None),
    };

    let registry = tracing_subscriber::registry()
        .with(otel_layer)
        .with(env_filter)
        .with(file_layer);

    match log_format.as_str() {
        "json" => {
            // Production: JSON structured logging
            registry
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            // Development: Pretty formatting with colors
            registry
                .with(fmt::layer().pretty().with_writer(std::io::stderr))
                .init();
        }
    }

    if otel_missing {
        warn!("OpenTelemetry endpoint set but feature 'telemetry' not enabled");
        warn!("Rebuild with: cargo build --features telemetry");
    }

    Ok(guard)
}

/// Resolve the configured deadline source into a deadline and a render target
async fn bind(config: &AppConfig) -> Result<(Deadline, Binding)> {
    match config.deadline_source()? {
        DeadlineSource::Literal(raw) => {
            let deadline = Deadline::parse(&raw).map_err(CountdownError::from)?;
            Ok((deadline, console_binding(config)))
        }
        DeadlineSource::Page(path) => {
            info!(page = %path.display(), "Loading promo page...");
            if let Some(label) = &config.label {
                warn!(label = %label, "Label is ignored when rendering into a page");
            }
            let html = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("Failed to read page {}", path.display()))?;

            let page = PromoPage::parse(&html).map_err(CountdownError::from)?;
            let raw = page.deadline().map_err(CountdownError::from)?;
            let deadline = Deadline::parse(raw).map_err(CountdownError::from)?;
            Ok((deadline, Binding::Page(Arc::new(page.into_target()))))
        }
    }
}

fn console_binding(config: &AppConfig) -> Binding {
    match config.target {
        TargetKind::Log => {
            let label = config.label.as_deref().unwrap_or(DEFAULT_LOG_LABEL);
            Binding::Console {
                target: Arc::new(LogRenderTarget::new(label)),
                overwrite: false,
            }
        }
        TargetKind::Terminal => {
            let interactive = std::io::stdout().is_terminal();
            let mode = if interactive {
                LineMode::Overwrite
            } else {
                LineMode::Newline
            };

            let mut terminal = TerminalRenderTarget::stdout()
                .with_color(config.color && interactive)
                .with_mode(mode);
            if let Some(label) = &config.label {
                terminal = terminal.with_label(label.clone());
            }

            Binding::Console {
                target: Arc::new(terminal),
                overwrite: mode == LineMode::Overwrite,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_rejects_console_options() {
        for extra in [["--target", "log"], ["--label", "Sale"]] {
            let args = ["promo-countdown", "--page", "index.html", extra[0], extra[1]];
            assert!(Cli::try_parse_from(args).is_err(), "{extra:?} should conflict");
        }
    }

    #[test]
    fn test_console_options_with_deadline() {
        let cli = Cli::try_parse_from([
            "promo-countdown",
            "--deadline",
            "2030-01-01",
            "--target",
            "log",
            "--label",
            "Sale",
            "--no-color",
        ])
        .unwrap();

        let overrides = cli.overrides();
        assert_eq!(overrides.target.as_deref(), Some("log"));
        assert_eq!(overrides.label.as_deref(), Some("Sale"));
        assert_eq!(overrides.color, Some(false));
        assert!(overrides.page.is_none());
    }

    #[test]
    fn test_deadline_and_page_conflict() {
        let args = ["promo-countdown", "--deadline", "2030-01-01", "--page", "index.html"];
        assert!(Cli::try_parse_from(args).is_err());
    }
}
