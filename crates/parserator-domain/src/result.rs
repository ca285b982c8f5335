//! Parse results and the error taxonomy

use serde_json::{json, Map, Value};
use std::collections::BTreeSet;
use std::fmt;
use std::time::Duration;

/// Classification of a failed parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Schema rejected locally or by the service
    InvalidSchema,
    /// Input rejected locally or by the service
    InvalidInput,
    /// Missing or bad API key
    AuthenticationError,
    /// Too many requests; retryable
    RateLimitError,
    /// Plan quota used up
    QuotaExceededError,
    /// Request exceeded its timeout or deadline; retryable
    TimeoutError,
    /// Connection could not be made
    NetworkError,
    /// Unexpected HTTP status or transport failure
    TransportError,
    /// Service temporarily down; retryable
    ServiceUnavailableError,
    /// Response body was not the expected JSON
    DecodeError,
    /// Anything the client does not recognize
    UnknownError,
}

impl ErrorKind {
    /// Stable upper-snake code used in user-facing output
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::InvalidSchema => "INVALID_SCHEMA",
            ErrorKind::InvalidInput => "INVALID_INPUT",
            ErrorKind::AuthenticationError => "AUTHENTICATION_ERROR",
            ErrorKind::RateLimitError => "RATE_LIMIT_ERROR",
            ErrorKind::QuotaExceededError => "QUOTA_EXCEEDED",
            ErrorKind::TimeoutError => "TIMEOUT_ERROR",
            ErrorKind::NetworkError => "NETWORK_ERROR",
            ErrorKind::TransportError => "TRANSPORT_ERROR",
            ErrorKind::ServiceUnavailableError => "SERVICE_UNAVAILABLE",
            ErrorKind::DecodeError => "DECODE_ERROR",
            ErrorKind::UnknownError => "UNKNOWN_ERROR",
        }
    }

    /// Map a service error code. Case-insensitive; unrecognized codes map
    /// to [`ErrorKind::UnknownError`].
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_uppercase().as_str() {
            "INVALID_SCHEMA" | "SCHEMA_ERROR" => ErrorKind::InvalidSchema,
            "INVALID_INPUT" | "VALIDATION_ERROR" | "BAD_REQUEST" => ErrorKind::InvalidInput,
            "AUTHENTICATION_ERROR" | "INVALID_API_KEY" | "UNAUTHORIZED" | "UNAUTHENTICATED" => {
                ErrorKind::AuthenticationError
            }
            "RATE_LIMIT" | "RATE_LIMIT_ERROR" | "RATE_LIMIT_EXCEEDED" | "RATE_LIMITED" => {
                ErrorKind::RateLimitError
            }
            "QUOTA_EXCEEDED" | "QUOTA_EXCEEDED_ERROR" => ErrorKind::QuotaExceededError,
            "TIMEOUT" | "TIMEOUT_ERROR" => ErrorKind::TimeoutError,
            "NETWORK_ERROR" => ErrorKind::NetworkError,
            "TRANSPORT_ERROR" | "HTTP_ERROR" => ErrorKind::TransportError,
            "SERVICE_UNAVAILABLE" | "SERVICE_UNAVAILABLE_ERROR" => ErrorKind::ServiceUnavailableError,
            "DECODE_ERROR" => ErrorKind::DecodeError,
            _ => ErrorKind::UnknownError,
        }
    }

    /// Whether a retry of the same request can reasonably succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ErrorKind::TimeoutError | ErrorKind::ServiceUnavailableError | ErrorKind::RateLimitError
        )
    }

    /// Default hint shown when the service gives none
    pub fn default_suggestion(&self) -> Option<&'static str> {
        match self {
            ErrorKind::InvalidSchema => Some("Use 1-50 named fields with recognized type tags"),
            ErrorKind::InvalidInput => Some("Provide non-blank input of at most 100,000 characters"),
            ErrorKind::AuthenticationError => Some("Check the API key (expected pk_live_... or pk_test_...)"),
            ErrorKind::RateLimitError => Some("Slow down and retry after a short delay"),
            ErrorKind::QuotaExceededError => Some("Upgrade the plan or wait for the quota to reset"),
            ErrorKind::TimeoutError => Some("Retry, or raise the timeout for large inputs"),
            ErrorKind::NetworkError => Some("Check connectivity to the service base URL"),
            ErrorKind::ServiceUnavailableError => Some("The service is temporarily unavailable; retry later"),
            ErrorKind::TransportError | ErrorKind::DecodeError | ErrorKind::UnknownError => None,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Metadata attached to a successful parse
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseMetadata {
    /// Service confidence (0.0..=1.0)
    pub confidence: f64,
    /// Service-side processing time
    pub processing_time: Duration,
    /// Tokens consumed
    pub tokens_used: u64,
    /// Opaque request identifier
    pub request_id: String,
    /// Feature flags reported by the service
    pub features: BTreeSet<String>,
}

/// Successful parse
#[derive(Debug, Clone, PartialEq)]
pub struct ParseSuccess {
    /// Extracted fields; keys are a subset of the requested schema's names
    pub parsed_data: Map<String, Value>,
    /// Service metadata
    pub metadata: ParseMetadata,
    /// Set when this result came from a fallback schema: the failure the
    /// primary schema ended with
    pub primary_failure: Option<ParseFailure>,
}

/// Failed parse
#[derive(Debug, Clone, PartialEq)]
pub struct ParseFailure {
    /// Classification
    pub kind: ErrorKind,
    /// Human-readable message
    pub message: String,
    /// What the caller can do about it
    pub recovery_suggestion: Option<String>,
    /// HTTP status, when the failure came from a non-2xx response
    pub status: Option<u16>,
    /// Raw response body, when the failure came from an HTTP exchange
    pub body: Option<String>,
    /// Service-provided details, for diagnosis
    pub details: Option<Value>,
    /// Set when a fallback schema was also tried and failed
    pub fallback_failure: Option<Box<ParseFailure>>,
}

impl ParseFailure {
    /// Failure with the kind's default suggestion
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            recovery_suggestion: kind.default_suggestion().map(str::to_string),
            status: None,
            body: None,
            details: None,
            fallback_failure: None,
        }
    }

    /// Attach an HTTP status
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Attach the raw response body
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Attach diagnostic details
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Replace the recovery suggestion
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.recovery_suggestion = Some(suggestion.into());
        self
    }

    /// Record that a fallback attempt failed too
    pub fn with_fallback_failure(mut self, fallback: ParseFailure) -> Self {
        self.fallback_failure = Some(Box::new(fallback));
        self
    }

    /// JSON error object: `{"code", "message", "suggestion"?, "status"?, "fallback"?}`
    pub fn to_json(&self) -> Value {
        let mut error = Map::new();
        error.insert("code".to_string(), Value::from(self.kind.code()));
        error.insert("message".to_string(), Value::from(self.message.clone()));
        if let Some(suggestion) = &self.recovery_suggestion {
            error.insert("suggestion".to_string(), Value::from(suggestion.clone()));
        }
        if let Some(status) = self.status {
            error.insert("status".to_string(), Value::from(status));
        }
        if let Some(fallback) = &self.fallback_failure {
            error.insert("fallback".to_string(), fallback.to_json());
        }
        Value::Object(error)
    }
}

impl fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.code(), self.message)?;
        if let Some(fallback) = &self.fallback_failure {
            write!(f, " (fallback schema also failed: {})", fallback)?;
        }
        Ok(())
    }
}

/// Outcome of a parse. Remote failures are values, never panics or `Err`s.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseResult {
    /// Parsed data and metadata
    Success(ParseSuccess),
    /// Typed error
    Failure(ParseFailure),
}

impl ParseResult {
    /// Shorthand for a failure with the kind's default suggestion
    pub fn failure(kind: ErrorKind, message: impl Into<String>) -> Self {
        ParseResult::Failure(ParseFailure::new(kind, message))
    }

    /// Whether this is a success
    pub fn is_success(&self) -> bool {
        matches!(self, ParseResult::Success(_))
    }

    /// Parsed data when successful
    pub fn parsed_data(&self) -> Option<&Map<String, Value>> {
        match self {
            ParseResult::Success(s) => Some(&s.parsed_data),
            ParseResult::Failure(_) => None,
        }
    }

    /// Metadata when successful
    pub fn metadata(&self) -> Option<&ParseMetadata> {
        match self {
            ParseResult::Success(s) => Some(&s.metadata),
            ParseResult::Failure(_) => None,
        }
    }

    /// Failure details when failed
    pub fn failure_ref(&self) -> Option<&ParseFailure> {
        match self {
            ParseResult::Success(_) => None,
            ParseResult::Failure(f) => Some(f),
        }
    }

    /// Error kind when failed
    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.failure_ref().map(|f| f.kind)
    }

    /// User-facing JSON: `{"success": true, "parsedData", "metadata"}` or
    /// `{"success": false, "error": {...}}`.
    pub fn to_json(&self) -> Value {
        match self {
            ParseResult::Success(s) => {
                let features: Vec<&String> = s.metadata.features.iter().collect();
                let mut body = json!({
                    "success": true,
                    "parsedData": Value::Object(s.parsed_data.clone()),
                    "metadata": {
                        "confidence": s.metadata.confidence,
                        "processingTimeMs": s.metadata.processing_time.as_millis() as u64,
                        "tokensUsed": s.metadata.tokens_used,
                        "requestId": s.metadata.request_id,
                        "features": features,
                    }
                });
                if let (Some(primary), Value::Object(map)) = (&s.primary_failure, &mut body) {
                    map.insert("primaryError".to_string(), primary.to_json());
                }
                body
            }
            ParseResult::Failure(f) => json!({
                "success": false,
                "error": f.to_json(),
            }),
        }
    }
}
