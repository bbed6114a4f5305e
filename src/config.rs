//! Connection settings read once at startup.
//!
//! Recognised variables (a `.env` file in the working directory is loaded first):
//!
//! - `PANOS_HOSTNAME` (required): hostname or IP of the firewall, optionally with `:port`
//! - `PANOS_API_KEY` (required): pre-issued XML API key
//! - `PANOS_DEBUG`: enable debug logging (`true`, `1`, `yes`, `y`, `on`)
//! - `PANOS_TIMEOUT`: per-request timeout in seconds (default 30)
//! - `PANOS_VERIFY_SSL`: verify the firewall's TLS certificate (default `true`)

use std::env;
use std::fmt;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),

    #[error("Invalid value '{value}' for {var}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: &'static str,
    },
}

#[derive(Clone)]
pub struct PanosConfig {
    pub hostname: String,
    pub api_key: String,
    pub debug: bool,
    pub timeout: Duration,
    pub verify_ssl: bool,
}

impl PanosConfig {
    pub fn new(hostname: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            api_key: api_key.into(),
            debug: false,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            verify_ssl: true,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |var: &'static str| {
            lookup(var)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(var))
        };

        let hostname = required("PANOS_HOSTNAME")?;
        let api_key = required("PANOS_API_KEY")?;

        let debug = lookup("PANOS_DEBUG").map(|v| parse_flag(&v)).unwrap_or(false);

        let verify_ssl = match lookup("PANOS_VERIFY_SSL") {
            Some(v) if !v.trim().is_empty() => parse_flag(&v),
            _ => true,
        };

        let timeout = match lookup("PANOS_TIMEOUT") {
            Some(raw) if !raw.trim().is_empty() => {
                let secs = raw.trim().parse::<u64>().map_err(|_| ConfigError::Invalid {
                    var: "PANOS_TIMEOUT",
                    value: raw.clone(),
                    reason: "expected a whole number of seconds",
                })?;
                if secs == 0 {
                    return Err(ConfigError::Invalid {
                        var: "PANOS_TIMEOUT",
                        value: raw,
                        reason: "timeout must be greater than zero",
                    });
                }
                Duration::from_secs(secs)
            }
            _ => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        Ok(Self {
            hostname,
            api_key,
            debug,
            timeout,
            verify_ssl,
        })
    }
}

impl fmt::Debug for PanosConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PanosConfig")
            .field("hostname", &self.hostname)
            .field("api_key", &"<redacted>")
            .field("debug", &self.debug)
            .field("timeout", &self.timeout)
            .field("verify_ssl", &self.verify_ssl)
            .finish()
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "true" | "1" | "yes" | "y" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = PanosConfig::from_lookup(lookup_from(&[
            ("PANOS_HOSTNAME", "fw01.example.com"),
            ("PANOS_API_KEY", "LUFRPT1234"),
        ]))
        .unwrap();

        assert_eq!(config.hostname, "fw01.example.com");
        assert_eq!(config.api_key, "LUFRPT1234");
        assert!(!config.debug);
        assert!(config.verify_ssl);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_overrides() {
        let config = PanosConfig::from_lookup(lookup_from(&[
            ("PANOS_HOSTNAME", "fw01"),
            ("PANOS_API_KEY", "k"),
            ("PANOS_DEBUG", "Yes"),
            ("PANOS_TIMEOUT", "5"),
            ("PANOS_VERIFY_SSL", "false"),
        ]))
        .unwrap();

        assert!(config.debug);
        assert!(!config.verify_ssl);
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_missing_required_variables() {
        let err = PanosConfig::from_lookup(lookup_from(&[("PANOS_API_KEY", "k")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("PANOS_HOSTNAME"));

        let err = PanosConfig::from_lookup(lookup_from(&[
            ("PANOS_HOSTNAME", "fw01"),
            ("PANOS_API_KEY", "  "),
        ]))
        .unwrap_err();
        assert_eq!(err, ConfigError::Missing("PANOS_API_KEY"));
    }

    #[test]
    fn test_invalid_timeout() {
        for raw in ["soon", "0", "-1"] {
            let err = PanosConfig::from_lookup(lookup_from(&[
                ("PANOS_HOSTNAME", "fw01"),
                ("PANOS_API_KEY", "k"),
                ("PANOS_TIMEOUT", raw),
            ]))
            .unwrap_err();
            assert!(matches!(err, ConfigError::Invalid { var: "PANOS_TIMEOUT", .. }));
        }
    }

    #[test]
    fn test_debug_output_redacts_api_key() {
        let config = PanosConfig::new("fw01", "super-secret-key");
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("super-secret-key"));
        assert!(rendered.contains("<redacted>"));
    }
}
