// ⚙️ Service Configuration - environment variables with logged defaults
//
// Anything missing or unparsable falls back to its default; an unparsable
// value is logged with the parser's reason.

use crate::error::ConfigError;
use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_ENVIRONMENT: &str = "production";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

// ============================================================================
// CONFIG
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Deployment name, e.g. "production" or "development"
    pub environment: String,

    pub host: String,

    pub port: u16,

    /// Longest the server waits for a request body
    pub read_timeout: Duration,

    /// Longest a request may take to produce a response
    pub write_timeout: Duration,

    /// Seed the store with the sample receipts at startup
    pub load_example_data: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            environment: DEFAULT_ENVIRONMENT.to_string(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            read_timeout: DEFAULT_TIMEOUT,
            write_timeout: DEFAULT_TIMEOUT,
            load_example_data: true,
        }
    }
}

impl Config {
    /// Load configuration from the process environment
    pub fn load() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key/value source
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        Config {
            environment: setting(&lookup, "API_ENV", defaults.environment, |v| Ok(v.to_string())),
            host: setting(&lookup, "API_HOSTNAME", defaults.host, |v| Ok(v.to_string())),
            port: setting(&lookup, "API_PORT", defaults.port, parse_value),
            read_timeout: setting(&lookup, "API_READ_TIMEOUT", defaults.read_timeout, parse_duration),
            write_timeout: setting(&lookup, "API_WRITE_TIMEOUT", defaults.write_timeout, parse_duration),
            load_example_data: setting(
                &lookup,
                "API_LOAD_EXAMPLE_DATA",
                defaults.load_example_data,
                parse_value,
            ),
        }
    }

    /// `host:port` to bind the listener to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// ============================================================================
// PARSING
// ============================================================================

/// Read one variable, falling back to `default` when it is absent or bad
fn setting<T, F, P>(lookup: &F, key: &str, default: T, parse: P) -> T
where
    T: std::fmt::Debug,
    F: Fn(&str) -> Option<String>,
    P: Fn(&str) -> Result<T, String>,
{
    match lookup(key) {
        Some(raw) => match parse_setting(key, &raw, parse) {
            Ok(value) => value,
            Err(ConfigError::InvalidValue { key, value, reason }) => {
                tracing::warn!(%key, %value, %reason, ?default, "invalid value, falling back to default");
                default
            }
        },
        None => {
            tracing::debug!(key, ?default, "environment variable not set, using default");
            default
        }
    }
}

fn parse_setting<T, P>(key: &str, raw: &str, parse: P) -> Result<T, ConfigError>
where
    P: Fn(&str) -> Result<T, String>,
{
    parse(raw).map_err(|reason| ConfigError::InvalidValue {
        key: key.to_string(),
        value: raw.to_string(),
        reason,
    })
}

fn parse_value<T>(raw: &str) -> Result<T, String>
where
    T: FromStr,
    T::Err: Display,
{
    raw.trim().parse::<T>().map_err(|e| e.to_string())
}

/// Durations use humantime syntax: "15s", "500ms", "1m 30s"
fn parse_duration(raw: &str) -> Result<Duration, String> {
    humantime::parse_duration(raw.trim()).map_err(|e| e.to_string())
}
