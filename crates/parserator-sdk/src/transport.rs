//! HTTP transport
//!
//! One `POST {base_url}/v1/parse` per call, with the canonical body and a
//! bearer token when one is configured. The transport never retries and
//! never interprets the body; both belong to the layers above it.

use crate::config::ClientConfig;
use crate::error::{SdkError, TransportError};
use async_trait::async_trait;
use parserator_domain::ParseRequest;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Status code and body of one HTTP exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code
    pub status: u16,
    /// Body text, unparsed
    pub body: String,
}

impl RawResponse {
    /// Create a response from a status and body
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Create a response whose body is serialized JSON
    pub fn json(status: u16, body: &serde_json::Value) -> Self {
        Self::new(status, body.to_string())
    }

    /// Whether the status is 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Service health as reported by `GET /health`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    /// `healthy` when the service is up
    pub status: String,
    /// Optional detail
    #[serde(default)]
    pub message: String,
}

impl HealthStatus {
    /// Health status for an unreachable or failing service
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
        }
    }

    /// Whether the service reported itself healthy
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy") || self.status.eq_ignore_ascii_case("ok")
    }
}

/// A single request/response exchange with the parsing service.
///
/// Implementations must be safe to share across concurrent parses.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one parse request and return the raw response
    async fn send(&self, request: &ParseRequest) -> Result<RawResponse, TransportError>;

    /// Probe service liveness
    async fn health_check(&self) -> Result<HealthStatus, TransportError>;
}

/// reqwest-backed transport
#[derive(Debug, Clone)]
pub struct HttpTransport {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build a transport from validated configuration.
    ///
    /// The underlying connection pool is shared by every request sent
    /// through this transport (and its clones).
    pub fn new(config: &ClientConfig) -> Result<Self, SdkError> {
        config.validate().map_err(SdkError::InvalidConfig)?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| SdkError::InvalidConfig(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: config.normalized_base_url().to_string(),
            api_key: config.api_key.clone(),
            client,
        })
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn parse_url(&self) -> String {
        format!("{}/v1/parse", self.base_url)
    }

    fn health_url(&self) -> String {
        format!("{}/health", self.base_url)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &ParseRequest) -> Result<RawResponse, TransportError> {
        let mut builder = self.client.post(self.parse_url()).json(&request.to_wire());

        if let Some(timeout) = request.options().and_then(|o| o.timeout) {
            builder = builder.timeout(timeout);
        }
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        debug!(
            url = %self.parse_url(),
            input_chars = request.input().chars().count(),
            fields = request.schema().len(),
            "Sending parse request"
        );

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        debug!(status, body_len = body.len(), "Received parse response");

        Ok(RawResponse { status, body })
    }

    async fn health_check(&self) -> Result<HealthStatus, TransportError> {
        let response = self.client.get(self.health_url()).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Ok(HealthStatus::error(format!("HTTP {}: {}", status.as_u16(), body)));
        }

        serde_json::from_str(&body)
            .map_err(|e| TransportError::InvalidResponse(format!("health body: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls_from_config() {
        let transport = HttpTransport::new(&ClientConfig::new("http://localhost:8080/")).unwrap();
        assert_eq!(transport.base_url(), "http://localhost:8080");
        assert_eq!(transport.parse_url(), "http://localhost:8080/v1/parse");
        assert_eq!(transport.health_url(), "http://localhost:8080/health");
    }

    #[test]
    fn test_invalid_config_rejected() {
        let err = HttpTransport::new(&ClientConfig::new("localhost")).unwrap_err();
        assert!(matches!(err, SdkError::InvalidConfig(_)));
    }

    #[test]
    fn test_health_status() {
        let healthy: HealthStatus = serde_json::from_str(r#"{"status":"healthy"}"#).unwrap();
        assert!(healthy.is_healthy());
        assert!(healthy.message.is_empty());
        assert!(!HealthStatus::error("connection refused").is_healthy());
    }

    #[test]
    fn test_raw_response_success_range() {
        assert!(RawResponse::new(200, "").is_success());
        assert!(RawResponse::new(204, "").is_success());
        assert!(!RawResponse::new(301, "").is_success());
        assert!(!RawResponse::new(429, "").is_success());
    }
}
