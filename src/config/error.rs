//! Configuration errors.

use thiserror::Error;

/// Errors that can occur when building a configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("Server base URL not specified. Call .base_url(url) before .build()")]
    MissingBaseUrl,

    #[error("Base URL '{0}' must start with http:// or https://")]
    InvalidBaseUrl(String),

    #[error("Tick period must be greater than zero")]
    ZeroTickPeriod,

    #[error("Ping interval must be greater than zero")]
    ZeroPingInterval,

    #[error("Server path for '{0}' must not be empty")]
    EmptyPath(&'static str),
}

/// Errors that can occur when loading configuration from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required env var {var}")]
    Missing { var: &'static str },

    #[error("invalid {var}: {reason}")]
    Invalid { var: &'static str, reason: String },

    #[error(transparent)]
    Build(#[from] BuildError),
}
