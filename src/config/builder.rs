//! Builder for navigator configuration.

use crate::config::error::BuildError;
use crate::config::{
    ServerPaths, SimConfig, DEFAULT_PING_INTERVAL, DEFAULT_REQUEST_TIMEOUT, DEFAULT_TICKS,
    DEFAULT_TICK_PERIOD,
};
use std::time::Duration;

/// Builder for [`SimConfig`] with a fluent API.
#[derive(Debug, Clone)]
pub struct SimConfigBuilder {
    base_url: Option<String>,
    paths: ServerPaths,
    tick_period: Duration,
    ticks: usize,
    ping_interval: Duration,
    request_timeout: Duration,
}

impl SimConfigBuilder {
    /// Create a new builder with default timings and paths.
    pub fn new() -> Self {
        Self {
            base_url: None,
            paths: ServerPaths::default(),
            tick_period: DEFAULT_TICK_PERIOD,
            ticks: DEFAULT_TICKS,
            ping_interval: DEFAULT_PING_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Set the server base URL (required).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Replace all request paths.
    pub fn paths(mut self, paths: ServerPaths) -> Self {
        self.paths = paths;
        self
    }

    pub fn tick_period(mut self, period: Duration) -> Self {
        self.tick_period = period;
        self
    }

    pub fn ticks(mut self, ticks: usize) -> Self {
        self.ticks = ticks;
        self
    }

    pub fn ping_interval(mut self, interval: Duration) -> Self {
        self.ping_interval = interval;
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Build the configuration.
    /// Returns an error if required fields are missing or timings are zero.
    pub fn build(self) -> Result<SimConfig, BuildError> {
        let base_url = self.base_url.ok_or(BuildError::MissingBaseUrl)?;
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(BuildError::InvalidBaseUrl(base_url));
        }
        if self.tick_period.is_zero() {
            return Err(BuildError::ZeroTickPeriod);
        }
        if self.ping_interval.is_zero() {
            return Err(BuildError::ZeroPingInterval);
        }
        for (name, path) in [
            ("init", &self.paths.init),
            ("succ", &self.paths.succ),
            ("ping", &self.paths.ping),
            ("quit", &self.paths.quit),
        ] {
            if path.trim_matches('/').is_empty() {
                return Err(BuildError::EmptyPath(name));
            }
        }

        Ok(SimConfig {
            base_url,
            paths: self.paths,
            tick_period: self.tick_period,
            ticks: self.ticks,
            ping_interval: self.ping_interval,
            request_timeout: self.request_timeout,
        })
    }
}

impl Default for SimConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
