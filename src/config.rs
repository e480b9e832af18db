use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::board::pipeline::DEFAULT_SLOT_IN_SLA_MINUTES;
use crate::board::urgency::{UrgencyPolicy, DEFAULT_CRITICAL_FRACTION, DEFAULT_WARNING_FRACTION};
use crate::error::ConfigError;

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// JSON file holding the job snapshot exported from the store
    pub snapshot_path: PathBuf,

    /// Address the HTTP server binds to
    /// Default: 127.0.0.1
    pub bind_address: String,

    /// Default: 8080
    pub port: u16,

    /// Maximum payload size for all requests (in bytes)
    /// Default: 10MB (10 * 1024 * 1024)
    pub max_payload_size: usize,

    /// Seconds between background snapshot refreshes
    /// Default: 30
    pub refresh_interval_secs: u64,

    /// Directory for the rolling log files
    /// Default: logs
    pub log_dir: String,

    /// SLA countdown thresholds as fractions of the target
    pub urgency: UrgencyPolicy,

    /// Acknowledgement window for slot-in jobs without an explicit target
    /// Default: 15
    pub slot_in_sla_minutes: i64,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Required environment variables:
    /// - SNAPSHOT_PATH: JSON job snapshot to serve
    ///
    /// Optional environment variables:
    /// - BIND_ADDRESS (default: 127.0.0.1)
    /// - PORT (default: 8080)
    /// - MAX_PAYLOAD_SIZE: Maximum request payload size in bytes (default: 10485760 = 10MB)
    /// - REFRESH_INTERVAL_SECS (default: 30)
    /// - LOG_DIR (default: logs)
    /// - SLA_WARNING_FRACTION (default: 0.5)
    /// - SLA_CRITICAL_FRACTION (default: 0.2)
    /// - SLOT_IN_SLA_MINUTES (default: 15)
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        dotenv::dotenv().ok();

        let snapshot_path = env::var("SNAPSHOT_PATH")
            .map(PathBuf::from)
            .map_err(|_| ConfigError::Missing {
                name: "SNAPSHOT_PATH",
            })?;

        let bind_address = env::var("BIND_ADDRESS").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = parse_var("PORT", 8080)?;
        let max_payload_size = parse_var("MAX_PAYLOAD_SIZE", 10 * 1024 * 1024)?;
        let refresh_interval_secs = parse_var("REFRESH_INTERVAL_SECS", 30)?;
        let log_dir = env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string());

        let urgency = UrgencyPolicy {
            warning_fraction: parse_var("SLA_WARNING_FRACTION", DEFAULT_WARNING_FRACTION)?,
            critical_fraction: parse_var("SLA_CRITICAL_FRACTION", DEFAULT_CRITICAL_FRACTION)?,
        };
        validate_thresholds(&urgency)?;

        let slot_in_sla_minutes = parse_var("SLOT_IN_SLA_MINUTES", DEFAULT_SLOT_IN_SLA_MINUTES)?;
        if slot_in_sla_minutes <= 0 {
            return Err(ConfigError::Invalid {
                name: "SLOT_IN_SLA_MINUTES",
                value: slot_in_sla_minutes.to_string(),
            });
        }

        Ok(Config {
            snapshot_path,
            bind_address,
            port,
            max_payload_size,
            refresh_interval_secs,
            log_dir,
            urgency,
            slot_in_sla_minutes,
        })
    }
}

/// Read an optional variable, falling back to `default` when it is unset.
fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        Err(_) => Ok(default),
    }
}

pub fn validate_thresholds(policy: &UrgencyPolicy) -> Result<(), ConfigError> {
    let UrgencyPolicy {
        warning_fraction: warning,
        critical_fraction: critical,
    } = *policy;

    if 0.0 < critical && critical < warning && warning < 1.0 {
        Ok(())
    } else {
        Err(ConfigError::Thresholds { warning, critical })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_thresholds_are_valid() {
        assert!(validate_thresholds(&UrgencyPolicy::default()).is_ok());
    }

    #[test]
    fn test_inverted_thresholds_rejected() {
        let policy = UrgencyPolicy {
            warning_fraction: 0.2,
            critical_fraction: 0.5,
        };
        assert!(matches!(
            validate_thresholds(&policy),
            Err(ConfigError::Thresholds { .. })
        ));

        let policy = UrgencyPolicy {
            warning_fraction: 1.5,
            critical_fraction: 0.2,
        };
        assert!(validate_thresholds(&policy).is_err());
    }
}
