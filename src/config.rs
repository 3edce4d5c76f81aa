//! Application-level configuration loading: device address, polling cadence and dashboard options.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

use crate::{services::aggregation::EmptyHalfPolicy, state::connectivity::PollPolicy};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "PIGGY_BANK_BACK_CONFIG_PATH";
/// Environment variable that overrides the device base URL.
const DEVICE_URL_ENV: &str = "DEVICE_BASE_URL";
/// mDNS name announced by the device firmware.
const DEFAULT_DEVICE_URL: &str = "http://piggybank.local";
/// Savings goal shown on the balance card, in pence.
const DEFAULT_SAVINGS_GOAL: u64 = 5_000;

/// How to reach the Piggy Bank Plus device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceConfig {
    /// Base URL of the device firmware API.
    pub base_url: String,
    /// Per-request timeout; `None` leaves the transport default in place.
    pub request_timeout: Option<Duration>,
}

impl DeviceConfig {
    /// Construct a configuration pointing at `base_url` with no explicit timeout.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            request_timeout: None,
        }
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DEVICE_URL)
    }
}

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Device connection settings.
    pub device: DeviceConfig,
    /// Poll cadence and backoff.
    pub polling: PollPolicy,
    /// Savings goal in pence; `None` disables goal progress.
    pub savings_goal: Option<u64>,
    /// What the improvement trend reports when half of the sessions hold no answers.
    pub trend_policy: EmptyHalfPolicy,
}

impl AppConfig {
    /// Load the configuration from disk, falling back to built-in defaults, then apply
    /// environment overrides.
    pub fn load() -> Self {
        let path = resolve_config_path();
        let mut config = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        device = %app_config.device.base_url,
                        "loaded configuration"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        };

        if let Some(url) = env::var(DEVICE_URL_ENV).ok().filter(|url| !url.is_empty()) {
            config.device.base_url = url;
        }

        config
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            device: DeviceConfig::default(),
            polling: PollPolicy::default(),
            savings_goal: Some(DEFAULT_SAVINGS_GOAL),
            trend_policy: EmptyHalfPolicy::default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    device_url: Option<String>,
    request_timeout_ms: Option<u64>,
    poll_interval_ms: Option<u64>,
    backoff_interval_ms: Option<u64>,
    failure_threshold: Option<u32>,
    /// `0` disables the goal.
    savings_goal: Option<u64>,
    trend_policy: Option<EmptyHalfPolicy>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let defaults = AppConfig::default();
        let polling = PollPolicy {
            interval: non_zero("poll_interval_ms", value.poll_interval_ms)
                .map(Duration::from_millis)
                .unwrap_or(defaults.polling.interval),
            backoff_interval: non_zero("backoff_interval_ms", value.backoff_interval_ms)
                .map(Duration::from_millis)
                .unwrap_or(defaults.polling.backoff_interval),
            failure_threshold: non_zero("failure_threshold", value.failure_threshold)
                .unwrap_or(defaults.polling.failure_threshold),
        };

        Self {
            device: DeviceConfig {
                base_url: value.device_url.unwrap_or(defaults.device.base_url),
                request_timeout: non_zero("request_timeout_ms", value.request_timeout_ms)
                    .map(Duration::from_millis),
            },
            polling,
            savings_goal: match value.savings_goal {
                Some(0) => None,
                Some(goal) => Some(goal),
                None => defaults.savings_goal,
            },
            trend_policy: value.trend_policy.unwrap_or(defaults.trend_policy),
        }
    }
}

/// Drop a zero setting with a warning so the built-in default applies instead.
fn non_zero<T>(field: &str, value: Option<T>) -> Option<T>
where
    T: Copy + Default + PartialEq,
{
    match value {
        Some(zero) if zero == T::default() => {
            warn!(field, "config value must be positive; using default");
            None
        }
        other => other,
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_config_fills_missing_fields_with_defaults() {
        let raw: RawConfig = serde_json::from_str(r#"{ "poll_interval_ms": 500 }"#).unwrap();
        let config = AppConfig::from(raw);

        assert_eq!(config.polling.interval, Duration::from_millis(500));
        assert_eq!(config.polling.backoff_interval, Duration::from_secs(10));
        assert_eq!(config.polling.failure_threshold, 5);
        assert_eq!(config.device.base_url, DEFAULT_DEVICE_URL);
        assert_eq!(config.device.request_timeout, None);
        assert_eq!(config.savings_goal, Some(DEFAULT_SAVINGS_GOAL));
        assert_eq!(config.trend_policy, EmptyHalfPolicy::Absent);
    }

    #[test]
    fn zero_savings_goal_disables_goal() {
        let raw: RawConfig =
            serde_json::from_str(r#"{ "savings_goal": 0, "trend_policy": "zero" }"#).unwrap();
        let config = AppConfig::from(raw);

        assert_eq!(config.savings_goal, None);
        assert_eq!(config.trend_policy, EmptyHalfPolicy::Zero);
    }

    #[test]
    fn zero_polling_settings_fall_back_to_defaults() {
        let raw: RawConfig = serde_json::from_str(
            r#"{
                "poll_interval_ms": 0,
                "backoff_interval_ms": 0,
                "failure_threshold": 0,
                "request_timeout_ms": 0
            }"#,
        )
        .unwrap();
        let config = AppConfig::from(raw);

        assert_eq!(config.polling, PollPolicy::default());
        assert_eq!(config.device.request_timeout, None);
    }
}
