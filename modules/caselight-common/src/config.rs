use std::env;

use tracing::info;

use crate::error::CaselightError;
use crate::safety::SafetyThresholds;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Postgres (identity map + run reports)
    pub database_url: String,

    // Upstream case-management API
    pub casefile_api_url: String,
    pub casefile_api_token: String,

    // WordPress content store
    pub wordpress_url: String,
    pub wordpress_user: String,
    pub wordpress_app_password: String,

    // Optional secondary calendar sink
    pub calendar_webhook_url: Option<String>,

    pub sync: SyncConfig,
}

impl Config {
    /// Load configuration from environment variables. Missing required
    /// variables surface as a `Config` error so the caller can abort the
    /// pass before any record is touched.
    pub fn from_env() -> Result<Self, CaselightError> {
        Ok(Self {
            database_url: required_env("DATABASE_URL")?,
            casefile_api_url: required_env("CASEFILE_API_URL")?,
            casefile_api_token: required_env("CASEFILE_API_TOKEN")?,
            wordpress_url: required_env("WORDPRESS_URL")?,
            wordpress_user: required_env("WORDPRESS_USER")?,
            wordpress_app_password: required_env("WORDPRESS_APP_PASSWORD")?,
            calendar_webhook_url: env::var("CALENDAR_WEBHOOK_URL").ok(),
            sync: SyncConfig::from_env()?,
        })
    }

    /// Log which settings are present without leaking secrets.
    pub fn log_redacted(&self) {
        info!(
            casefile_api_url = self.casefile_api_url.as_str(),
            wordpress_url = self.wordpress_url.as_str(),
            calendar_sink = self.calendar_webhook_url.is_some(),
            significance_floor = self.sync.significance_floor,
            auto_publish = self.sync.auto_publish,
            interval_minutes = self.sync.interval_minutes,
            "Configuration loaded"
        );
    }
}

/// Tunables consumed by the sync engine. Passed in explicitly so passes are
/// reproducible; the engine never reads ambient global state.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Records below this significance are never publishable. Also the
    /// minimum inclusion threshold for timeline-event fetches.
    pub significance_floor: u32,
    /// Records at or above this significance skip the text heuristics.
    pub auto_safe_threshold: u32,
    /// When set, new entries are created approved instead of pending.
    pub auto_publish: bool,
    /// Scheduler period.
    pub interval_minutes: u64,
    pub event_batch_limit: u32,
    pub resource_batch_limit: u32,
    /// How far ahead to look for upcoming hearings.
    pub hearing_window_days: i64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        let thresholds = SafetyThresholds::default();
        Self {
            significance_floor: thresholds.floor,
            auto_safe_threshold: thresholds.auto_safe,
            auto_publish: false,
            interval_minutes: 15,
            event_batch_limit: 200,
            resource_batch_limit: 100,
            hearing_window_days: 30,
        }
    }
}

impl SyncConfig {
    pub fn from_env() -> Result<Self, CaselightError> {
        let defaults = Self::default();
        Ok(Self {
            significance_floor: parsed_env("SIGNIFICANCE_FLOOR", defaults.significance_floor)?,
            auto_safe_threshold: parsed_env("AUTO_SAFE_THRESHOLD", defaults.auto_safe_threshold)?,
            auto_publish: parsed_env("AUTO_PUBLISH", defaults.auto_publish)?,
            interval_minutes: parsed_env("SYNC_INTERVAL_MINUTES", defaults.interval_minutes)?,
            event_batch_limit: parsed_env("EVENT_BATCH_LIMIT", defaults.event_batch_limit)?,
            resource_batch_limit: parsed_env("RESOURCE_BATCH_LIMIT", defaults.resource_batch_limit)?,
            hearing_window_days: parsed_env("HEARING_WINDOW_DAYS", defaults.hearing_window_days)?,
        })
    }

    pub fn thresholds(&self) -> SafetyThresholds {
        SafetyThresholds {
            floor: self.significance_floor,
            auto_safe: self.auto_safe_threshold,
        }
    }

    /// Sanity-check the tunables. Called at the start of every pass.
    pub fn validate(&self) -> Result<(), CaselightError> {
        if self.significance_floor > 1000 || self.auto_safe_threshold > 1000 {
            return Err(CaselightError::Config(
                "significance thresholds must be within 0-1000".to_string(),
            ));
        }
        if self.auto_safe_threshold < self.significance_floor {
            return Err(CaselightError::Config(
                "AUTO_SAFE_THRESHOLD must be >= SIGNIFICANCE_FLOOR".to_string(),
            ));
        }
        if self.event_batch_limit == 0 || self.resource_batch_limit == 0 {
            return Err(CaselightError::Config(
                "batch limits must be positive".to_string(),
            ));
        }
        if self.hearing_window_days <= 0 {
            return Err(CaselightError::Config(
                "HEARING_WINDOW_DAYS must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

fn required_env(key: &str) -> Result<String, CaselightError> {
    env::var(key).map_err(|_| CaselightError::Config(format!("{key} environment variable is required")))
}

fn parsed_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T, CaselightError> {
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| CaselightError::Config(format!("{key} has an invalid value: {raw}"))),
        Err(_) => Ok(default),
    }
}
