//! Startup configuration for the retrieval pipeline.

use std::env;
use std::path::PathBuf;

use time::Duration;

use crate::ValidationError;

pub const DEFAULT_BASE_URL: &str = "https://www.alphavantage.co/query";
pub const DEFAULT_TTL_HOURS: i64 = 24;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 15_000;

/// Explicit configuration handed to the store, fetcher and orchestrator constructors.
#[derive(Clone, PartialEq, Eq)]
pub struct RetrievalConfig {
    /// Alpha Vantage API key. Never logged.
    pub api_key: String,
    /// Directory holding one JSON document per symbol.
    pub data_dir: PathBuf,
    /// Provider query endpoint.
    pub base_url: String,
    /// Maximum age of a cache entry before it is refreshed.
    pub ttl: Duration,
    /// Per-request timeout for the provider call.
    pub request_timeout_ms: u64,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            api_key: String::from("demo"),
            data_dir: resolve_tickvault_home().join("data"),
            base_url: String::from(DEFAULT_BASE_URL),
            ttl: Duration::hours(DEFAULT_TTL_HOURS),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }
}

impl std::fmt::Debug for RetrievalConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetrievalConfig")
            .field("api_key", &"<redacted>")
            .field("data_dir", &self.data_dir)
            .field("base_url", &self.base_url)
            .field("ttl", &self.ttl)
            .field("request_timeout_ms", &self.request_timeout_ms)
            .finish()
    }
}

impl RetrievalConfig {
    /// Build a configuration from the process environment.
    ///
    /// | Variable | Meaning |
    /// |----------|---------|
    /// | `TICKVAULT_ALPHAVANTAGE_API_KEY` | API key (falls back to `ALPHA_VANTAGE_API_KEY`, then `demo`) |
    /// | `TICKVAULT_HOME` | Root directory; entries live under `<home>/data` |
    /// | `TICKVAULT_TTL_HOURS` | Freshness window in whole hours |
    pub fn from_env() -> Result<Self, ValidationError> {
        let mut config = Self::default();

        if let Some(key) = non_empty_var("TICKVAULT_ALPHAVANTAGE_API_KEY")
            .or_else(|| non_empty_var("ALPHA_VANTAGE_API_KEY"))
        {
            config.api_key = key;
        }

        if let Some(raw) = non_empty_var("TICKVAULT_TTL_HOURS") {
            config.ttl = parse_ttl_hours(&raw)?;
        }

        Ok(config)
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_request_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.request_timeout_ms = timeout_ms;
        self
    }
}

/// Parse a TTL given in whole hours; zero and negative values are rejected.
pub fn parse_ttl_hours(raw: &str) -> Result<Duration, ValidationError> {
    let hours = raw
        .trim()
        .parse::<i64>()
        .map_err(|error| ValidationError::InvalidConfig {
            name: "TICKVAULT_TTL_HOURS",
            reason: error.to_string(),
        })?;

    if hours <= 0 {
        return Err(ValidationError::InvalidConfig {
            name: "TICKVAULT_TTL_HOURS",
            reason: String::from("must be greater than zero"),
        });
    }

    Ok(Duration::hours(hours))
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn resolve_tickvault_home() -> PathBuf {
    if let Some(path) = env::var_os("TICKVAULT_HOME") {
        let path = PathBuf::from(path);
        if !path.as_os_str().is_empty() {
            return path;
        }
    }

    if let Some(home) = env::var_os("HOME") {
        return PathBuf::from(home).join(".tickvault");
    }

    PathBuf::from(".tickvault")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_provider_free_tier() {
        let config = RetrievalConfig::default();
        assert_eq!(config.ttl, Duration::hours(24));
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(config.data_dir.ends_with("data"));
    }

    #[test]
    fn debug_output_redacts_api_key() {
        let config = RetrievalConfig::default().with_api_key("secret-key-123");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("secret-key-123"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn ttl_hours_must_be_positive() {
        assert_eq!(parse_ttl_hours("6"), Ok(Duration::hours(6)));
        assert!(parse_ttl_hours("0").is_err());
        assert!(parse_ttl_hours("soon").is_err());
    }
}
