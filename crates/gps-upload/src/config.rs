use std::env;
use std::time::Duration;

use chrono_tz::Tz;
use route_boundary::{Cadence, DetectorConfig, MovementThreshold};
use tracing::warn;

const DEFAULT_KEY_PREFIX: &str = "fleet";
const DEFAULT_REPORTING_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// Upload processing configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Zone the provider's local timestamps are expressed in.
    pub timezone: Tz,
    pub detector: DetectorConfig,
    /// Namespace for keys written to the state store.
    pub key_prefix: String,
}

impl Config {
    /// Builds configuration from the environment, falling back to defaults
    /// for anything missing or invalid.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = DetectorConfig::default();

        let timezone = env::var("TIMEZONE").map_or(chrono_tz::UTC, |value| {
            value.parse::<Tz>().unwrap_or_else(|err| {
                warn!(timezone = %value, error = %err, "invalid timezone; defaulting to UTC");
                chrono_tz::UTC
            })
        });

        let interval = env_minutes("REPORTING_INTERVAL_MINS", DEFAULT_REPORTING_INTERVAL);
        let cadence = if env_bool("OBSERVED_CADENCE", false) {
            Cadence::Observed { fallback: interval }
        } else {
            Cadence::Fixed(interval)
        };

        let detector = DetectorConfig {
            movement_threshold: env_threshold(
                "MOVEMENT_THRESHOLD_DEG",
                defaults.movement_threshold,
            ),
            movement_lookahead: env_minutes("MOVEMENT_LOOKAHEAD_MINS", defaults.movement_lookahead),
            stop_verification: env_minutes("STOP_VERIFICATION_MINS", defaults.stop_verification),
            min_stationary: env_minutes("MIN_STATIONARY_MINS", defaults.min_stationary),
            cadence,
        };

        let key_prefix =
            env::var("STORE_KEY_PREFIX").unwrap_or_else(|_| DEFAULT_KEY_PREFIX.to_string());

        Self { timezone, detector, key_prefix }
    }

    #[must_use]
    pub fn shift_key(&self, shift_id: &str) -> String {
        format!("{}:shift:{shift_id}", self.key_prefix)
    }

    #[must_use]
    pub fn pings_key(&self, shift_id: &str) -> String {
        format!("{}:pings:{shift_id}", self.key_prefix)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timezone: chrono_tz::UTC,
            detector: DetectorConfig::default(),
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
        }
    }
}

fn env_bool(key: &str, default: bool) -> bool {
    parse_bool(key, env::var(key).ok().as_deref(), default)
}

fn env_threshold(key: &str, default: MovementThreshold) -> MovementThreshold {
    parse_threshold(key, env::var(key).ok().as_deref(), default)
}

fn env_minutes(key: &str, default: Duration) -> Duration {
    parse_minutes(key, env::var(key).ok().as_deref(), default)
}

fn parse_bool(key: &str, value: Option<&str>, default: bool) -> bool {
    let Some(value) = value else {
        return default;
    };
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => true,
        "false" | "0" | "no" => false,
        _ => {
            warn!(key, value, "invalid boolean; using default");
            default
        }
    }
}

fn parse_threshold(
    key: &str, value: Option<&str>, default: MovementThreshold,
) -> MovementThreshold {
    let Some(value) = value else {
        return default;
    };
    match value.parse::<f64>() {
        Ok(degrees) => MovementThreshold::checked(degrees).unwrap_or_else(|| {
            warn!(key, value, "threshold must be finite and not negative; using default");
            default
        }),
        Err(err) => {
            warn!(key, value, error = %err, "invalid number; using default");
            default
        }
    }
}

fn parse_minutes(key: &str, value: Option<&str>, default: Duration) -> Duration {
    let Some(value) = value else {
        return default;
    };
    match value.parse::<u64>() {
        Ok(minutes) => Duration::from_secs(minutes.saturating_mul(60)),
        Err(err) => {
            warn!(key, value, error = %err, "invalid minutes; using default");
            default
        }
    }
}
