//! Parserator client implementation.

use crate::config::ClientConfig;
use crate::error::SdkError;
use crate::resilience::{parse_with_resilience, RetryPolicy};
use crate::transport::{HealthStatus, HttpTransport, Transport};
use futures::stream::{self, StreamExt};
use parserator_domain::{
    get_preset, DomainError, ErrorKind, ParseOptions, ParseRequest, ParseResult, SchemaDescriptor,
};
use std::path::Path;
use tracing::{debug, info, warn};

/// Default number of batch requests in flight
pub const DEFAULT_BATCH_CONCURRENCY: usize = 3;

/// Batch execution options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOptions {
    /// Maximum requests in flight at once (minimum 1)
    pub concurrency: usize,
    /// Stop at the first failure; later requests are not reported
    pub fail_fast: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_BATCH_CONCURRENCY,
            fail_fast: false,
        }
    }
}

/// Outcome of a batch, in request order
#[derive(Debug, Clone, PartialEq)]
pub struct BatchReport {
    /// One result per completed request, in the order requests were given
    pub results: Vec<ParseResult>,
    /// Successful results
    pub succeeded: usize,
    /// Failed results
    pub failed: usize,
    /// Requests never reported because `fail_fast` stopped the batch
    pub skipped: usize,
    /// Tokens consumed across successful results
    pub tokens_used: u64,
}

impl BatchReport {
    fn from_results(results: Vec<ParseResult>, total: usize) -> Self {
        let succeeded = results.iter().filter(|r| r.is_success()).count();
        let tokens_used = results
            .iter()
            .filter_map(ParseResult::metadata)
            .map(|m| m.tokens_used)
            .sum();
        Self {
            failed: results.len() - succeeded,
            skipped: total - results.len(),
            succeeded,
            tokens_used,
            results,
        }
    }
}

/// Parserator SDK client
///
/// Immutable after construction and safe to share between tasks; each
/// call is independent. The transport is pluggable for testing.
///
/// # Example
///
/// ```no_run
/// use parserator_sdk::{ClientConfig, ParseratorClient};
/// use parserator_domain::{FieldType, SchemaDescriptor};
///
/// # async fn run() -> Result<(), parserator_sdk::SdkError> {
/// let client = ParseratorClient::new(ClientConfig::default().with_api_key("pk_test_..."))?;
/// let schema = SchemaDescriptor::new([("name", FieldType::String), ("email", FieldType::Email)])?;
///
/// let result = client.parse("Maria Garcia <maria@example.com>", &schema, None).await;
/// println!("{}", result.to_json());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ParseratorClient<T: Transport = HttpTransport> {
    transport: T,
    config: ClientConfig,
}

impl ParseratorClient<HttpTransport> {
    /// Create a client backed by HTTP
    pub fn new(config: ClientConfig) -> Result<Self, SdkError> {
        let transport = HttpTransport::new(&config)?;
        info!(base_url = %transport.base_url(), authenticated = config.api_key.is_some(), "Parserator client ready");
        Ok(Self { transport, config })
    }
}

impl<T: Transport> ParseratorClient<T> {
    /// Create a client over any transport
    pub fn with_transport(transport: T, config: ClientConfig) -> Self {
        Self { transport, config }
    }

    /// Client configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Retry policy for a request: the request's own retry budget wins
    fn policy_for(&self, request: &ParseRequest) -> RetryPolicy {
        let mut policy = self.config.retry_policy();
        if let Some(max_retries) = request.options().and_then(|o| o.max_retries) {
            policy.max_retries = max_retries;
        }
        policy
    }

    /// Parse `text` into `schema`, with optional context instructions.
    ///
    /// This is the call framework adapters make. Local validation failures
    /// come back as `ParseResult::Failure` like everything else.
    pub async fn parse(&self, text: &str, schema: &SchemaDescriptor, context: Option<&str>) -> ParseResult {
        match ParseRequest::build(text, schema.clone(), context, None) {
            Ok(request) => self.parse_request(&request).await,
            Err(e) => domain_failure(e),
        }
    }

    /// Send a prepared request with retries
    pub async fn parse_request(&self, request: &ParseRequest) -> ParseResult {
        self.parse_with_fallback(request, None).await
    }

    /// Send a prepared request with retries, then the fallback schema if
    /// the primary schema fails
    pub async fn parse_with_fallback(
        &self,
        request: &ParseRequest,
        fallback_schema: Option<&SchemaDescriptor>,
    ) -> ParseResult {
        debug!(
            fields = request.schema().len(),
            input_chars = request.input().chars().count(),
            fallback = fallback_schema.is_some(),
            "Parsing"
        );

        let result = parse_with_resilience(&self.transport, request, fallback_schema, &self.policy_for(request)).await;

        match &result {
            ParseResult::Success(success) => debug!(
                confidence = success.metadata.confidence,
                tokens = success.metadata.tokens_used,
                request_id = %success.metadata.request_id,
                from_fallback = success.primary_failure.is_some(),
                "Parse succeeded"
            ),
            ParseResult::Failure(failure) => warn!(code = failure.kind.code(), message = %failure.message, "Parse failed"),
        }
        result
    }

    /// Parse `text` with a named preset. `overrides` win over the preset's
    /// own options.
    pub async fn parse_preset(&self, name: &str, text: &str, overrides: Option<&ParseOptions>) -> ParseResult {
        let Some(preset) = get_preset(name) else {
            return ParseResult::failure(ErrorKind::InvalidSchema, format!("unknown preset '{}'", name));
        };
        match preset.request(text, overrides) {
            Ok(request) => self.parse_request(&request).await,
            Err(e) => domain_failure(e),
        }
    }

    /// Read a UTF-8 file and parse its contents.
    ///
    /// Read errors come back as `INVALID_INPUT` failures.
    pub async fn parse_file(
        &self,
        path: impl AsRef<Path>,
        schema: &SchemaDescriptor,
        instructions: Option<&str>,
    ) -> ParseResult {
        let path = path.as_ref();
        match tokio::fs::read_to_string(path).await {
            Ok(text) => self.parse(&text, schema, instructions).await,
            Err(e) => ParseResult::failure(
                ErrorKind::InvalidInput,
                format!("failed to read {}: {}", path.display(), e),
            ),
        }
    }

    /// Run many requests with bounded concurrency.
    ///
    /// Results keep request order. With `fail_fast`, the batch stops at
    /// the first failure in order and in-flight requests are cancelled.
    ///
    /// # Errors
    ///
    /// `InvalidInput` when `requests` is empty.
    pub async fn parse_batch(
        &self,
        requests: &[ParseRequest],
        options: BatchOptions,
    ) -> Result<BatchReport, SdkError> {
        if requests.is_empty() {
            return Err(DomainError::InvalidInput("batch contains no requests".to_string()).into());
        }

        let concurrency = options.concurrency.max(1);
        info!(requests = requests.len(), concurrency, fail_fast = options.fail_fast, "Starting batch");

        let mut results = Vec::with_capacity(requests.len());
        let mut pending = stream::iter(requests.iter().map(|r| self.parse_request(r))).buffered(concurrency);

        while let Some(result) = pending.next().await {
            let failed = !result.is_success();
            results.push(result);
            if failed && options.fail_fast {
                warn!(index = results.len() - 1, "Stopping batch at first failure");
                break;
            }
        }

        let report = BatchReport::from_results(results, requests.len());
        info!(
            succeeded = report.succeeded,
            failed = report.failed,
            skipped = report.skipped,
            tokens = report.tokens_used,
            "Batch finished"
        );
        Ok(report)
    }

    /// Probe service liveness. Unreachable services report an `error` status.
    pub async fn health_check(&self) -> HealthStatus {
        match self.transport.health_check().await {
            Ok(status) => status,
            Err(e) => {
                warn!(error = %e, "Health check failed");
                HealthStatus::error(e.to_string())
            }
        }
    }

    /// Release the client and its connection pool
    pub fn close(self) {
        debug!("Closing Parserator client");
    }
}

fn domain_failure(e: DomainError) -> ParseResult {
    ParseResult::failure(e.kind(), e.to_string())
}
