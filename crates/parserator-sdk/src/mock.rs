//! Scripted transport for tests and offline development

use crate::error::TransportError;
use crate::transport::{HealthStatus, RawResponse, Transport};
use async_trait::async_trait;
use parserator_domain::{ParseRequest, SchemaDescriptor};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

type Reply = Result<RawResponse, TransportError>;

/// Mock transport that replays scripted replies.
///
/// Replies are chosen in this order: a rule matching the request's schema,
/// then the next queued reply, then the default reply. With none of those
/// the call fails with a connection error. Clones share state, so a test
/// can keep a handle after moving the mock into a client.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    queue: Arc<Mutex<VecDeque<Reply>>>,
    rules: Arc<Mutex<Vec<(SchemaDescriptor, Reply)>>>,
    default_reply: Arc<Mutex<Option<Reply>>>,
    latency: Arc<Mutex<Option<Duration>>>,
    health: Arc<Mutex<Option<Result<HealthStatus, TransportError>>>>,
    requests: Arc<Mutex<Vec<ParseRequest>>>,
    in_flight: Arc<Mutex<(usize, usize)>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockTransport {
    /// Create an empty mock
    pub fn new() -> Self {
        Self::default()
    }

    /// Mock that answers every request with `body` and status 200
    pub fn always(body: Value) -> Self {
        let mock = Self::new();
        mock.set_default(RawResponse::json(200, &body));
        mock
    }

    /// Queue a JSON reply
    pub fn push_json(&self, status: u16, body: Value) -> &Self {
        self.push_response(RawResponse::json(status, &body))
    }

    /// Queue a raw reply
    pub fn push_response(&self, response: RawResponse) -> &Self {
        lock(&self.queue).push_back(Ok(response));
        self
    }

    /// Queue a transport failure
    pub fn push_error(&self, error: TransportError) -> &Self {
        lock(&self.queue).push_back(Err(error));
        self
    }

    /// Reply used once the queue is empty
    pub fn set_default(&self, response: RawResponse) -> &Self {
        *lock(&self.default_reply) = Some(Ok(response));
        self
    }

    /// Always answer requests for `schema` with `response`
    pub fn respond_for_schema(&self, schema: &SchemaDescriptor, response: RawResponse) -> &Self {
        lock(&self.rules).push((schema.clone(), Ok(response)));
        self
    }

    /// Delay every reply
    pub fn set_latency(&self, latency: Duration) -> &Self {
        *lock(&self.latency) = Some(latency);
        self
    }

    /// Health reply; defaults to healthy
    pub fn set_health(&self, health: Result<HealthStatus, TransportError>) -> &Self {
        *lock(&self.health) = Some(health);
        self
    }

    /// Number of parse requests sent
    pub fn call_count(&self) -> usize {
        lock(&self.requests).len()
    }

    /// Every parse request sent, in order
    pub fn requests(&self) -> Vec<ParseRequest> {
        lock(&self.requests).clone()
    }

    /// Highest number of requests in flight at once
    pub fn max_in_flight(&self) -> usize {
        lock(&self.in_flight).1
    }

    fn next_reply(&self, request: &ParseRequest) -> Reply {
        if let Some((_, reply)) = lock(&self.rules)
            .iter()
            .find(|(schema, _)| schema == request.schema())
        {
            return reply.clone();
        }
        if let Some(reply) = lock(&self.queue).pop_front() {
            return reply;
        }
        lock(&self.default_reply)
            .clone()
            .unwrap_or_else(|| Err(TransportError::Connection("mock script exhausted".to_string())))
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: &ParseRequest) -> Result<RawResponse, TransportError> {
        lock(&self.requests).push(request.clone());
        {
            let mut in_flight = lock(&self.in_flight);
            in_flight.0 += 1;
            in_flight.1 = in_flight.1.max(in_flight.0);
        }

        let latency = *lock(&self.latency);
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        lock(&self.in_flight).0 -= 1;
        self.next_reply(request)
    }

    async fn health_check(&self) -> Result<HealthStatus, TransportError> {
        lock(&self.health).clone().unwrap_or_else(|| {
            Ok(HealthStatus {
                status: "healthy".to_string(),
                message: String::new(),
            })
        })
    }
}
