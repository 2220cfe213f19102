//! Runner configuration
//!
//! Layered with the `config` crate, lowest to highest precedence:
//! built-in defaults, TOML file, `PROMO_COUNTDOWN_*` environment variables,
//! command-line flags.

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use directories::ProjectDirs;
use promo_countdown_core::application::TimerConfig;
use promo_countdown_core::domain::ExpiryDisplay;
use promo_countdown_core::CountdownError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_PREFIX: &str = "PROMO_COUNTDOWN";
const DEFAULT_TICK_MS: i64 = 1000;
const CONFIG_FILE_NAME: &str = "config.toml";

/// Where frames are written when no page is given
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Terminal,
    Log,
}

/// Where the deadline comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeadlineSource {
    Literal(String),
    Page(PathBuf),
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub deadline: Option<String>,
    #[serde(default)]
    pub page: Option<PathBuf>,
    pub target: TargetKind,
    pub color: bool,
    pub tick_ms: u64,
    pub expiry_display: ExpiryDisplay,
    #[serde(default)]
    pub label: Option<String>,
}

/// Values supplied on the command line
#[derive(Debug, Default)]
pub struct Overrides {
    pub deadline: Option<String>,
    pub page: Option<String>,
    pub target: Option<String>,
    pub color: Option<bool>,
    pub tick_ms: Option<u64>,
    pub expiry_display: Option<String>,
    pub label: Option<String>,
}

impl AppConfig {
    /// Load and validate the layered configuration
    ///
    /// An explicit file must exist; the per-user default file is optional.
    pub fn load(explicit: Option<&Path>, overrides: Overrides) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("target", "terminal")?
            .set_default("color", true)?
            .set_default("tick_ms", DEFAULT_TICK_MS)?
            .set_default("expiry_display", "zeroed")?;

        builder = match explicit {
            Some(path) => builder.add_source(File::from(path).required(true)),
            None => match default_config_path() {
                Some(path) => builder.add_source(File::from(path).required(false)),
                None => builder,
            },
        };

        let settings = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .set_override_option("deadline", overrides.deadline)?
            .set_override_option("page", overrides.page)?
            .set_override_option("target", overrides.target)?
            .set_override_option("color", overrides.color)?
            .set_override_option("tick_ms", overrides.tick_ms.map(|ms| ms as i64))?
            .set_override_option("expiry_display", overrides.expiry_display)?
            .set_override_option("label", overrides.label)?
            .build()
            .context("Failed to load configuration")?;

        let config: AppConfig = settings
            .try_deserialize()
            .context("Invalid configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> std::result::Result<(), CountdownError> {
        if self.tick_ms == 0 {
            return Err(CountdownError::Config("tick_ms must be positive".to_string()));
        }
        self.timer_config().validate()?;
        self.deadline_source().map(|_| ())
    }

    pub fn timer_config(&self) -> TimerConfig {
        TimerConfig {
            tick_interval: Duration::from_millis(self.tick_ms),
            expiry_display: self.expiry_display,
        }
    }

    /// Exactly one of `deadline` and `page` must be set
    pub fn deadline_source(&self) -> std::result::Result<DeadlineSource, CountdownError> {
        match (&self.deadline, &self.page) {
            (Some(deadline), None) => Ok(DeadlineSource::Literal(deadline.clone())),
            (None, Some(page)) => {
                let expanded = shellexpand::tilde(&page.to_string_lossy()).into_owned();
                Ok(DeadlineSource::Page(PathBuf::from(expanded)))
            }
            (Some(_), Some(_)) => Err(CountdownError::Config(
                "deadline and page are mutually exclusive".to_string(),
            )),
            (None, None) => Err(CountdownError::Config(
                "either deadline or page is required".to_string(),
            )),
        }
    }
}

/// Per-user config file (e.g. ~/.config/promo-countdown/config.toml)
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "promo-countdown")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}
