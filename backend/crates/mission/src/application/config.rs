//! Application Configuration
//!
//! Configuration for the mission application layer.

use platform::config::{ConfigError, bool_env_or, env_or, parse_env_or};
use platform::rate_limit::RateLimitConfig;
use std::time::Duration;

/// Mission application configuration
#[derive(Debug, Clone)]
pub struct MissionConfig {
    /// Submissions allowed per user per window
    pub submission_rate_limit: RateLimitConfig,
    /// Upper bound on waiting for the device position
    pub location_timeout: Duration,
    /// Whether a rejected submission may be retried
    pub allow_resubmission_after_rejection: bool,
    /// Postgres NOTIFY channel carrying row changes
    pub change_channel: String,
    /// First pause after the change feed fails; doubles while it keeps failing
    pub stats_retry_delay: Duration,
    /// Cap for list endpoints
    pub max_page_size: i64,
    pub default_page_size: i64,
}

impl Default for MissionConfig {
    fn default() -> Self {
        Self {
            submission_rate_limit: RateLimitConfig::new(10, 60),
            location_timeout: Duration::from_secs(10),
            allow_resubmission_after_rejection: true,
            change_channel: "mission_changes".to_string(),
            stats_retry_delay: Duration::from_secs(1),
            max_page_size: 200,
            default_page_size: 50,
        }
    }
}

impl MissionConfig {
    /// Read overrides from `MISSION_*` environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let max_requests = parse_env_or(
            "MISSION_SUBMIT_MAX_REQUESTS",
            defaults.submission_rate_limit.max_requests,
        )?;
        let window_secs = parse_env_or(
            "MISSION_SUBMIT_WINDOW_SECS",
            defaults.submission_rate_limit.window.as_secs(),
        )?;
        let timeout_ms = parse_env_or(
            "MISSION_LOCATION_TIMEOUT_MS",
            defaults.location_timeout.as_millis() as u64,
        )?;
        let retry_ms = parse_env_or(
            "MISSION_STATS_RETRY_MS",
            defaults.stats_retry_delay.as_millis() as u64,
        )?;

        Ok(Self {
            submission_rate_limit: RateLimitConfig::new(max_requests, window_secs),
            location_timeout: Duration::from_millis(timeout_ms),
            allow_resubmission_after_rejection: bool_env_or(
                "MISSION_ALLOW_RESUBMIT",
                defaults.allow_resubmission_after_rejection,
            )?,
            change_channel: env_or("MISSION_CHANGE_CHANNEL", &defaults.change_channel),
            stats_retry_delay: Duration::from_millis(retry_ms),
            ..defaults
        })
    }

    /// Clamp a requested page size into `1..=max_page_size`
    pub fn page_size(&self, requested: Option<i64>) -> i64 {
        requested
            .unwrap_or(self.default_page_size)
            .clamp(1, self.max_page_size)
    }
}
