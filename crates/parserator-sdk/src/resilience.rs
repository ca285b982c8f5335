//! Retry and fallback around a transport
//!
//! Retryable failures (rate limit, timeout, service unavailable) are retried
//! with capped exponential backoff. Other failures return at once. When the
//! primary schema finally fails and a fallback schema is given, the same
//! input is sent once more with the fallback schema.

use crate::error::TransportError;
use crate::normalize::normalize;
use crate::transport::Transport;
use parserator_domain::{ErrorKind, ParseRequest, ParseResult, SchemaDescriptor};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Retry budget and backoff
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry
    pub base_delay: Duration,
    /// Upper bound on any single delay
    pub max_delay: Duration,
    /// Cap on total wall time, backoff included
    pub deadline: Option<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(1_000),
            max_delay: Duration::from_millis(10_000),
            deadline: None,
        }
    }
}

impl RetryPolicy {
    /// Policy with the given retry budget and default backoff
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    /// Set backoff delays
    pub fn with_backoff(mut self, base_delay: Duration, max_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self.max_delay = max_delay;
        self
    }

    /// Set the overall deadline
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Delay before retry number `retry` (0-based): `base * 2^retry`, capped
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

/// Whether a fallback schema can change the outcome of this failure
fn fallback_applies(kind: ErrorKind) -> bool {
    !matches!(kind, ErrorKind::AuthenticationError | ErrorKind::QuotaExceededError)
}

/// Parse with retries and an optional fallback schema.
///
/// Never returns an error: every outcome is a [`ParseResult`].
///
/// - A fallback success carries the primary failure in `primary_failure`.
/// - A fallback failure returns the primary failure with the fallback's
///   failure attached.
/// - The fallback attempt is not retried and is skipped for authentication
///   and quota failures.
pub async fn parse_with_resilience<T>(
    transport: &T,
    request: &ParseRequest,
    fallback_schema: Option<&SchemaDescriptor>,
    policy: &RetryPolicy,
) -> ParseResult
where
    T: Transport + ?Sized,
{
    // A deadline too far out to represent is no deadline at all
    let deadline = policy.deadline.and_then(|d| Instant::now().checked_add(d));

    let primary = match with_retries(transport, request, policy, deadline).await {
        ParseResult::Success(success) => return ParseResult::Success(success),
        ParseResult::Failure(failure) => failure,
    };

    let Some(fallback_schema) = fallback_schema else {
        return ParseResult::Failure(primary);
    };
    if !fallback_applies(primary.kind) {
        debug!(code = primary.kind.code(), "Skipping fallback schema");
        return ParseResult::Failure(primary);
    }

    warn!(
        code = primary.kind.code(),
        message = %primary.message,
        "Primary schema failed, trying fallback schema"
    );

    let fallback_request = request.with_schema(fallback_schema.clone());
    match attempt(transport, &fallback_request, deadline).await {
        ParseResult::Success(mut success) => {
            success.primary_failure = Some(primary);
            ParseResult::Success(success)
        }
        ParseResult::Failure(fallback) => ParseResult::Failure(primary.with_fallback_failure(fallback)),
    }
}

async fn with_retries<T>(
    transport: &T,
    request: &ParseRequest,
    policy: &RetryPolicy,
    deadline: Option<Instant>,
) -> ParseResult
where
    T: Transport + ?Sized,
{
    let mut retry = 0;
    loop {
        let failure = match attempt(transport, request, deadline).await {
            ParseResult::Success(success) => return ParseResult::Success(success),
            ParseResult::Failure(failure) => failure,
        };

        if !failure.kind.is_retryable() {
            return ParseResult::Failure(failure);
        }
        if retry >= policy.max_retries {
            if policy.max_retries > 0 {
                warn!(attempts = retry + 1, code = failure.kind.code(), "Giving up after retries");
            }
            return ParseResult::Failure(failure);
        }

        let delay = policy.delay_for(retry);
        if let Some(deadline) = deadline {
            if Instant::now().checked_add(delay).map_or(true, |wake| wake >= deadline) {
                warn!(code = failure.kind.code(), "Deadline leaves no room for another attempt");
                return ParseResult::Failure(failure);
            }
        }

        retry += 1;
        warn!(
            retry,
            max_retries = policy.max_retries,
            code = failure.kind.code(),
            delay_ms = delay.as_millis() as u64,
            "Retrying parse request"
        );
        tokio::time::sleep(delay).await;
    }
}

/// One send plus normalization, bounded by the deadline
async fn attempt<T>(transport: &T, request: &ParseRequest, deadline: Option<Instant>) -> ParseResult
where
    T: Transport + ?Sized,
{
    let sent = match deadline {
        Some(deadline) => tokio::time::timeout_at(deadline, transport.send(request))
            .await
            .unwrap_or_else(|_| Err(TransportError::Timeout("overall deadline exceeded".to_string()))),
        None => transport.send(request).await,
    };

    match sent {
        Ok(raw) => normalize(&raw, request.schema()),
        Err(e) => ParseResult::Failure(e.into_failure()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::mock::MockTransport;
    use crate::transport::RawResponse;
    use parserator_domain::FieldType;
    use serde_json::json;

    fn schema() -> SchemaDescriptor {
        SchemaDescriptor::new([("name", FieldType::String)]).unwrap()
    }

    fn request() -> ParseRequest {
        ParseRequest::build("Maria Garcia, CTO", schema(), None, None).unwrap()
    }

    fn fast_policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy::new(max_retries).with_backoff(Duration::from_millis(1), Duration::from_millis(5))
    }

    fn success_body() -> serde_json::Value {
        json!({"success": true, "parsedData": {"name": "Maria Garcia"}, "metadata": {"confidence": 0.9}})
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(0), Duration::from_millis(1_000));
        assert_eq!(policy.delay_for(1), Duration::from_millis(2_000));
        assert_eq!(policy.delay_for(2), Duration::from_millis(4_000));
        assert_eq!(policy.delay_for(3), Duration::from_millis(8_000));
        assert_eq!(policy.delay_for(4), Duration::from_millis(10_000));
        assert_eq!(policy.delay_for(40), Duration::from_millis(10_000));
    }

    #[tokio::test]
    async fn test_rate_limit_retried_until_budget_spent() {
        let mock = MockTransport::new();
        mock.set_default(RawResponse::new(429, ""));

        let result = parse_with_resilience(&mock, &request(), None, &fast_policy(2)).await;

        assert_eq!(result.error_kind(), Some(ErrorKind::RateLimitError));
        assert_eq!(mock.call_count(), 3);
    }

    #[tokio::test]
    async fn test_recovers_after_transient_failure() {
        let mock = MockTransport::always(success_body());
        mock.push_json(503, json!({})).push_error(TransportError::Timeout("slow".into()));

        let result = parse_with_resilience(&mock, &request(), None, &fast_policy(3)).await;

        assert!(result.is_success());
        assert_eq!(mock.call_count(), 3);
    }

    #[tokio::test]
    async fn test_non_retryable_fails_immediately() {
        for status in [400, 401, 403] {
            let mock = MockTransport::new();
            mock.set_default(RawResponse::new(status, ""));

            let result = parse_with_resilience(&mock, &request(), None, &fast_policy(3)).await;

            assert!(!result.is_success());
            assert_eq!(mock.call_count(), 1, "status {}", status);
        }
    }

    #[tokio::test]
    async fn test_fallback_success_records_primary_failure() {
        let fallback = SchemaDescriptor::new([("text", FieldType::String)]).unwrap();
        let mock = MockTransport::always(success_body());
        mock.respond_for_schema(&schema(), RawResponse::new(503, ""));

        let result = parse_with_resilience(&mock, &request(), Some(&fallback), &fast_policy(1)).await;

        let ParseResult::Success(success) = result else {
            panic!("expected fallback success");
        };
        let primary = success.primary_failure.unwrap();
        assert_eq!(primary.kind, ErrorKind::ServiceUnavailableError);
        assert_eq!(mock.call_count(), 3);
        assert_eq!(mock.requests().last().unwrap().schema(), &fallback);
    }

    #[tokio::test]
    async fn test_fallback_failure_keeps_both() {
        let fallback = SchemaDescriptor::new([("text", FieldType::String)]).unwrap();
        let mock = MockTransport::new();
        mock.respond_for_schema(&schema(), RawResponse::new(500, ""))
            .respond_for_schema(&fallback, RawResponse::new(400, ""));

        let result = parse_with_resilience(&mock, &request(), Some(&fallback), &fast_policy(0)).await;

        let failure = result.failure_ref().unwrap();
        assert_eq!(failure.kind, ErrorKind::ServiceUnavailableError);
        assert_eq!(
            failure.fallback_failure.as_ref().map(|f| f.kind),
            Some(ErrorKind::InvalidInput)
        );
        assert!(failure.to_string().contains("fallback schema also failed"));
    }

    #[tokio::test]
    async fn test_no_fallback_on_authentication_failure() {
        let fallback = SchemaDescriptor::new([("text", FieldType::String)]).unwrap();
        let mock = MockTransport::always(success_body());
        mock.respond_for_schema(&schema(), RawResponse::new(401, ""));

        let result = parse_with_resilience(&mock, &request(), Some(&fallback), &fast_policy(3)).await;

        assert_eq!(result.error_kind(), Some(ErrorKind::AuthenticationError));
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_primary_success_skips_fallback() {
        let fallback = SchemaDescriptor::new([("text", FieldType::String)]).unwrap();
        let mock = MockTransport::always(success_body());

        let result = parse_with_resilience(&mock, &request(), Some(&fallback), &fast_policy(3)).await;

        assert!(result.is_success());
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_bounds_a_slow_attempt() {
        let mock = MockTransport::always(success_body());
        mock.set_latency(Duration::from_secs(60));
        let policy = fast_policy(3).with_deadline(Duration::from_secs(5));

        let result = parse_with_resilience(&mock, &request(), None, &policy).await;

        assert_eq!(result.error_kind(), Some(ErrorKind::TimeoutError));
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_unrepresentable_deadline_means_no_deadline() {
        let mock = MockTransport::always(success_body());
        mock.push_json(503, json!({}));
        let policy = ClientConfig::default()
            .with_backoff(1, 5)
            .with_overall_deadline_secs(u64::MAX)
            .retry_policy();

        let result = parse_with_resilience(&mock, &request(), None, &policy).await;

        assert!(result.is_success());
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_huge_backoff_gives_up_inside_deadline() {
        let mock = MockTransport::new();
        mock.set_default(RawResponse::new(429, ""));
        let policy = ClientConfig::default()
            .with_backoff(u64::MAX, u64::MAX)
            .with_overall_deadline_secs(5)
            .retry_policy();

        let result = parse_with_resilience(&mock, &request(), None, &policy).await;

        assert_eq!(result.error_kind(), Some(ErrorKind::RateLimitError));
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_caps_backoff() {
        let mock = MockTransport::new();
        mock.set_default(RawResponse::new(503, ""));
        let policy = RetryPolicy::new(10)
            .with_backoff(Duration::from_secs(2), Duration::from_secs(2))
            .with_deadline(Duration::from_secs(5));

        let result = parse_with_resilience(&mock, &request(), None, &policy).await;

        assert_eq!(result.error_kind(), Some(ErrorKind::ServiceUnavailableError));
        assert_eq!(mock.call_count(), 3);
    }
}
