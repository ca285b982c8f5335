//! Parserator Rust SDK
//!
//! Client library for the Parserator structured-extraction service.
//! Sends raw text plus a schema to `POST /v1/parse` and hands back a
//! [`ParseResult`](parserator_domain::ParseResult): parsed data with
//! metadata, or a typed failure. Remote failures are values, never `Err`.
//!
//! # Example
//!
//! ```no_run
//! use parserator_sdk::{ClientConfig, ParseratorClient};
//!
//! # async fn run() -> Result<(), parserator_sdk::SdkError> {
//! let client = ParseratorClient::new(ClientConfig::default().with_api_key("pk_live_..."))?;
//!
//! let result = client
//!     .parse_preset("contact", "Maria Garcia, CTO at Acme, maria@acme.com", None)
//!     .await;
//!
//! match result.parsed_data() {
//!     Some(data) => println!("{:?}", data.get("email")),
//!     None => eprintln!("{}", result.failure_ref().map(|f| f.to_string()).unwrap_or_default()),
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod client;
mod config;
mod error;
mod mock;
mod normalize;
mod resilience;
mod transport;

pub use client::{BatchOptions, BatchReport, ParseratorClient, DEFAULT_BATCH_CONCURRENCY};
pub use config::{BackoffConfig, ClientConfig, DEFAULT_BASE_URL, DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT_SECS};
pub use error::{SdkError, TransportError};
pub use mock::MockTransport;
pub use normalize::normalize;
pub use resilience::{parse_with_resilience, RetryPolicy};
pub use transport::{HealthStatus, HttpTransport, RawResponse, Transport};
