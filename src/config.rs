//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::str::FromStr;

/// Default period between background sweeps, in milliseconds
pub const DEFAULT_SWEEP_INTERVAL_MS: u64 = 60_000;

/// Default TTL for cache-first fetches and TTL-less writes, in milliseconds
pub const DEFAULT_TTL_MS: i64 = 3_600_000;

/// Default HTTP port of the host binary
pub const DEFAULT_SERVER_PORT: u16 = 3000;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Interval between background expiry sweeps, in milliseconds
    pub sweep_interval_ms: u64,
    /// TTL in milliseconds for entries stored without an explicit one
    pub default_ttl_ms: i64,
    /// HTTP server port
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SWEEP_INTERVAL_MS` - Sweep frequency in milliseconds (default: 60000)
    /// - `DEFAULT_TTL_MS` - Default TTL in milliseconds (default: 3600000)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    ///
    /// Missing or unparseable values fall back to their defaults.
    pub fn from_env() -> Self {
        Self {
            sweep_interval_ms: env_or("SWEEP_INTERVAL_MS", DEFAULT_SWEEP_INTERVAL_MS),
            default_ttl_ms: env_or("DEFAULT_TTL_MS", DEFAULT_TTL_MS),
            server_port: env_or("SERVER_PORT", DEFAULT_SERVER_PORT),
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sweep_interval_ms: DEFAULT_SWEEP_INTERVAL_MS,
            default_ttl_ms: DEFAULT_TTL_MS,
            server_port: DEFAULT_SERVER_PORT,
        }
    }
}
