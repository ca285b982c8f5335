//! Client configuration

use crate::resilience::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Production endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.parserator.com";

/// Default per-request timeout (seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default retries after the first attempt
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Backoff between retries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackoffConfig {
    /// Delay before the first retry; doubles per retry
    pub base_delay_ms: u64,
    /// Upper bound on any single delay
    pub max_delay_ms: u64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: 1_000,
            max_delay_ms: 10_000,
        }
    }
}

/// Connection and retry settings, fixed for the lifetime of a client.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Service base URL, without the `/v1/parse` suffix
    pub base_url: String,

    /// Bearer token; requests are unauthenticated when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Per-request timeout (seconds)
    pub timeout_secs: u64,

    /// Retries after the first attempt
    pub max_retries: u32,

    /// Retry backoff
    pub backoff: BackoffConfig,

    /// Cap on total wall time for one parse, retries included (seconds)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall_deadline_secs: Option<u64>,

    /// User-Agent header
    pub user_agent: String,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout_secs", &self.timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("backoff", &self.backoff)
            .field("overall_deadline_secs", &self.overall_deadline_secs)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl Default for ClientConfig {
    /// Production endpoint, unauthenticated, 30 s timeout, 3 retries
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
            backoff: BackoffConfig::default(),
            overall_deadline_secs: None,
            user_agent: concat!("parserator-rs/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ClientConfig {
    /// Default configuration against a specific base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Set the API key
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the per-request timeout
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Set the retry budget
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the backoff delays
    pub fn with_backoff(mut self, base_delay_ms: u64, max_delay_ms: u64) -> Self {
        self.backoff = BackoffConfig {
            base_delay_ms,
            max_delay_ms,
        };
        self
    }

    /// Cap total wall time per parse
    pub fn with_overall_deadline_secs(mut self, secs: u64) -> Self {
        self.overall_deadline_secs = Some(secs);
        self
    }

    /// Fast preset: short timeout, a single retry
    pub fn fast() -> Self {
        Self {
            timeout_secs: 10,
            max_retries: 1,
            backoff: BackoffConfig {
                base_delay_ms: 250,
                max_delay_ms: 1_000,
            },
            overall_deadline_secs: Some(20),
            ..Self::default()
        }
    }

    /// Patient preset: long timeout, more retries, bounded overall
    pub fn patient() -> Self {
        Self {
            timeout_secs: 120,
            max_retries: 5,
            backoff: BackoffConfig {
                base_delay_ms: 2_000,
                max_delay_ms: 30_000,
            },
            overall_deadline_secs: Some(600),
            ..Self::default()
        }
    }

    /// Base URL without trailing slashes
    pub fn normalized_base_url(&self) -> &str {
        self.base_url.trim().trim_end_matches('/')
    }

    /// Per-request timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Overall deadline as a Duration
    pub fn overall_deadline(&self) -> Option<Duration> {
        self.overall_deadline_secs.map(Duration::from_secs)
    }

    /// Retry policy derived from this configuration
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            base_delay: Duration::from_millis(self.backoff.base_delay_ms),
            max_delay: Duration::from_millis(self.backoff.max_delay_ms),
            deadline: self.overall_deadline(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        let url = self.normalized_base_url();
        if url.is_empty() {
            return Err("base_url must not be empty".to_string());
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(format!("base_url must start with http:// or https://, got '{}'", url));
        }
        if self.timeout_secs == 0 {
            return Err("timeout_secs must be greater than 0".to_string());
        }
        if self.backoff.max_delay_ms < self.backoff.base_delay_ms {
            return Err("backoff.max_delay_ms cannot be less than backoff.base_delay_ms".to_string());
        }
        if self.overall_deadline_secs == Some(0) {
            return Err("overall_deadline_secs must be greater than 0".to_string());
        }
        if let Some(key) = &self.api_key {
            if key.trim().is_empty() {
                return Err("api_key must not be blank when set".to_string());
            }
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ClientConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.max_retries, 3);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_presets_are_valid() {
        assert!(ClientConfig::fast().validate().is_ok());
        assert!(ClientConfig::patient().validate().is_ok());
    }

    #[test]
    fn test_invalid_configs() {
        assert!(ClientConfig::new("").validate().is_err());
        assert!(ClientConfig::new("ftp://example.com").validate().is_err());
        assert!(ClientConfig::default().with_timeout_secs(0).validate().is_err());
        assert!(ClientConfig::default().with_backoff(500, 100).validate().is_err());
        assert!(ClientConfig::default().with_api_key("  ").validate().is_err());
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let config = ClientConfig::new("http://localhost:8080/");
        assert_eq!(config.normalized_base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = ClientConfig::default().with_api_key("pk_live_secretsecretsecretsecret");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = ClientConfig::from_toml(
            r#"
            base_url = "http://localhost:9000"
            max_retries = 1
            "#,
        )
        .unwrap();
        assert_eq!(config.base_url, "http://localhost:9000");
        assert_eq!(config.max_retries, 1);
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = ClientConfig::patient().with_api_key("pk_test_abcdefghijklmnopqrstuvwx");
        let toml_str = config.to_toml().unwrap();
        let parsed = ClientConfig::from_toml(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_retry_policy_from_config() {
        let policy = ClientConfig::fast().retry_policy();
        assert_eq!(policy.max_retries, 1);
        assert_eq!(policy.base_delay, Duration::from_millis(250));
        assert_eq!(policy.deadline, Some(Duration::from_secs(20)));
    }
}
