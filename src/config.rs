//! Client configuration resolved from the environment.
//!
//! Defaulting happens exactly once, at construction: [`ClientConfig::from_env`]
//! reads the `TESTPOOL_*` variables and produces an immutable value that the
//! rest of the client consumes. Nothing re-reads the environment afterwards.

use std::time::Duration;

use crate::error::ConfigError;

/// Default manager base URL, including the API mount path.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000/api";

/// Default API version segment joined onto the base URL.
pub const DEFAULT_API_VERSION: &str = "v1";

/// Default per-request timeout in seconds.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Configuration for a pool manager client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the manager, e.g. `http://127.0.0.1:5000/api`.
    pub base_url: String,

    /// API version path segment, e.g. `v1`.
    pub api_version: String,

    /// Timeout applied to each exchange by the HTTP transport.
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl ClientConfig {
    /// Resolve configuration from the environment.
    ///
    /// - `TESTPOOL_BASE_URL` (default `http://127.0.0.1:5000/api`)
    /// - `TESTPOOL_API_VERSION` (default `v1`)
    /// - `TESTPOOL_REQUEST_TIMEOUT_SECONDS` (default 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url =
            optional_env("TESTPOOL_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let api_version =
            optional_env("TESTPOOL_API_VERSION").unwrap_or_else(|| DEFAULT_API_VERSION.to_string());

        let timeout_secs = parse_optional_env(
            "TESTPOOL_REQUEST_TIMEOUT_SECONDS",
            DEFAULT_REQUEST_TIMEOUT_SECS,
        )?;

        Ok(Self {
            base_url,
            api_version,
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

/// Read an environment variable, treating unset and empty as absent.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Read and parse an environment variable, falling back to a default when
/// unset.
fn parse_optional_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match optional_env(key) {
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        }),
        None => Ok(default),
    }
}
