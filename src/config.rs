//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;

use crate::cache::DEFAULT_TTL_SECONDS;

/// Deployment mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// Error bodies carry stack traces and `/docs` is mounted
    Development,
    Production,
}

impl Environment {
    /// Parses an `APP_ENV` value. Anything but `development`/`dev` is
    /// production.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Environment::Development,
            _ => Environment::Production,
        }
    }

    pub fn is_development(self) -> bool {
        self == Environment::Development
    }
}

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// TTL in seconds for cached GET responses
    pub cache_ttl: u64,
    pub environment: Environment,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CACHE_TTL` - Cached response lifetime in seconds (default: 3600)
    /// - `APP_ENV` - `development` or `production` (default: production)
    pub fn from_env() -> Self {
        Self {
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            cache_ttl: env::var("CACHE_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_TTL_SECONDS),
            environment: env::var("APP_ENV")
                .map(|v| Environment::parse(&v))
                .unwrap_or(Environment::Production),
        }
    }

    /// Whether error bodies include the diagnostic trace.
    pub fn include_stack(&self) -> bool {
        self.environment.is_development()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            cache_ttl: DEFAULT_TTL_SECONDS,
            environment: Environment::Production,
        }
    }
}
