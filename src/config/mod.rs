//! Navigator configuration.
//!
//! Configuration is loaded from environment variables or assembled with
//! [`SimConfigBuilder`]. It tells the navigator where the simulation
//! server lives, which paths it answers on, and how fast the player and
//! the keepalive loop run.

mod builder;
mod error;

pub use builder::SimConfigBuilder;
pub use error::{BuildError, ConfigError};

use std::time::Duration;

/// Default player period at speed 1.
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_millis(1000);

/// Default number of player ticks per play.
pub const DEFAULT_TICKS: usize = 10;

/// Default keepalive interval; the server gives up after 30 s of silence.
pub const DEFAULT_PING_INTERVAL: Duration = Duration::from_secs(10);

/// Default request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_millis(5000);

/// Request paths of the simulation server, relative to the base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerPaths {
    pub init: String,
    pub succ: String,
    pub ping: String,
    pub quit: String,
}

impl Default for ServerPaths {
    fn default() -> Self {
        Self {
            init: "init".to_owned(),
            succ: "succ".to_owned(),
            ping: "ping".to_owned(),
            quit: "quit".to_owned(),
        }
    }
}

/// Complete navigator configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimConfig {
    /// Server base URL including the session key, e.g. `http://127.0.0.1:8000/<key>/`.
    pub base_url: String,
    /// Request paths of the four server calls.
    pub paths: ServerPaths,
    /// Player period at speed 1.
    pub tick_period: Duration,
    /// Number of ticks a play runs for.
    pub ticks: usize,
    /// Interval between keepalive pings.
    pub ping_interval: Duration,
    /// Per-request timeout.
    pub request_timeout: Duration,
}

impl SimConfig {
    pub fn builder() -> SimConfigBuilder {
        SimConfigBuilder::new()
    }

    /// Load configuration from environment variables.
    ///
    /// Required variables:
    /// - `SIMTRACE_URL` -- server base URL including the session key
    ///
    /// Optional variables:
    /// - `SIMTRACE_INIT_PATH`, `SIMTRACE_SUCC_PATH`, `SIMTRACE_PING_PATH`,
    ///   `SIMTRACE_QUIT_PATH` -- request paths (defaults `init`, `succ`, `ping`, `quit`)
    /// - `SIMTRACE_TICK_MS` -- player period in milliseconds (default 1000)
    /// - `SIMTRACE_TICKS` -- ticks per play (default 10)
    /// - `SIMTRACE_PING_SECS` -- keepalive interval in seconds (default 10)
    /// - `SIMTRACE_TIMEOUT_MS` -- request timeout in milliseconds (default 5000)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("SIMTRACE_URL").ok_or(ConfigError::Missing {
            var: "SIMTRACE_URL",
        })?;

        let defaults = ServerPaths::default();
        let paths = ServerPaths {
            init: lookup("SIMTRACE_INIT_PATH").unwrap_or(defaults.init),
            succ: lookup("SIMTRACE_SUCC_PATH").unwrap_or(defaults.succ),
            ping: lookup("SIMTRACE_PING_PATH").unwrap_or(defaults.ping),
            quit: lookup("SIMTRACE_QUIT_PATH").unwrap_or(defaults.quit),
        };

        let tick_ms = parse_var(&lookup, "SIMTRACE_TICK_MS", 1000_u64)?;
        let ticks = parse_var(&lookup, "SIMTRACE_TICKS", DEFAULT_TICKS)?;
        let ping_secs = parse_var(&lookup, "SIMTRACE_PING_SECS", 10_u64)?;
        let timeout_ms = parse_var(&lookup, "SIMTRACE_TIMEOUT_MS", 5000_u64)?;

        let config = SimConfigBuilder::new()
            .base_url(base_url)
            .paths(paths)
            .tick_period(Duration::from_millis(tick_ms))
            .ticks(ticks)
            .ping_interval(Duration::from_secs(ping_secs))
            .request_timeout(Duration::from_millis(timeout_ms))
            .build()?;
        Ok(config)
    }
}

/// Parse an optional variable, falling back to `default` when unset.
fn parse_var<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(var) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            reason: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_apply_when_only_url_is_set() {
        let config =
            SimConfig::from_lookup(lookup(&[("SIMTRACE_URL", "http://127.0.0.1:8000/key/")]))
                .unwrap();

        assert_eq!(config.paths, ServerPaths::default());
        assert_eq!(config.tick_period, DEFAULT_TICK_PERIOD);
        assert_eq!(config.ticks, DEFAULT_TICKS);
        assert_eq!(config.ping_interval, DEFAULT_PING_INTERVAL);
        assert_eq!(config.request_timeout, DEFAULT_REQUEST_TIMEOUT);
    }

    #[test]
    fn missing_url_is_reported() {
        let result = SimConfig::from_lookup(lookup(&[]));
        assert!(matches!(
            result,
            Err(ConfigError::Missing {
                var: "SIMTRACE_URL"
            })
        ));
    }

    #[test]
    fn overrides_are_parsed() {
        let config = SimConfig::from_lookup(lookup(&[
            ("SIMTRACE_URL", "http://localhost:9000/abc"),
            ("SIMTRACE_SUCC_PATH", "next"),
            ("SIMTRACE_TICK_MS", "250"),
            ("SIMTRACE_TICKS", "40"),
            ("SIMTRACE_PING_SECS", "3"),
        ]))
        .unwrap();

        assert_eq!(config.paths.succ, "next");
        assert_eq!(config.paths.init, "init");
        assert_eq!(config.tick_period, Duration::from_millis(250));
        assert_eq!(config.ticks, 40);
        assert_eq!(config.ping_interval, Duration::from_secs(3));
    }

    #[test]
    fn invalid_number_is_reported() {
        let result = SimConfig::from_lookup(lookup(&[
            ("SIMTRACE_URL", "http://localhost:9000/abc"),
            ("SIMTRACE_TICKS", "many"),
        ]));
        assert!(matches!(
            result,
            Err(ConfigError::Invalid {
                var: "SIMTRACE_TICKS",
                ..
            })
        ));
    }

    #[test]
    fn zero_period_fails_validation() {
        let result = SimConfig::from_lookup(lookup(&[
            ("SIMTRACE_URL", "http://localhost:9000/abc"),
            ("SIMTRACE_TICK_MS", "0"),
        ]));
        assert!(matches!(
            result,
            Err(ConfigError::Build(BuildError::ZeroTickPeriod))
        ));
    }
}
