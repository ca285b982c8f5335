//! Response normalization
//!
//! Turns one raw HTTP exchange into a [`ParseResult`]. Pure: no I/O, no
//! clock, the same input always yields the same result.
//!
//! | status | body                       | result                             |
//! |--------|----------------------------|------------------------------------|
//! | 2xx    | `success: true`            | Success                            |
//! | 2xx    | `success: false` + `error` | Failure, kind from `error.code`    |
//! | 2xx    | not the expected JSON      | Failure, `DECODE_ERROR`            |
//! | non-2xx| anything                   | Failure, kind from the status code |

use crate::transport::RawResponse;
use parserator_domain::{ErrorKind, ParseFailure, ParseMetadata, ParseResult, ParseSuccess, SchemaDescriptor};
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::warn;

/// Normalize a raw response against the schema that was requested.
///
/// Extracted keys are passed through as the service returned them. Keys the
/// schema does not name are kept but logged, since the service is allowed
/// to omit fields and is not expected to invent them.
pub fn normalize(raw: &RawResponse, requested: &SchemaDescriptor) -> ParseResult {
    if !raw.is_success() {
        return ParseResult::Failure(http_failure(raw));
    }

    let body: Value = match serde_json::from_str(&raw.body) {
        Ok(body) => body,
        Err(e) => return ParseResult::Failure(decode_failure(raw, format!("body is not JSON: {}", e))),
    };

    let Some(body) = body.as_object() else {
        return ParseResult::Failure(decode_failure(raw, "body is not a JSON object"));
    };

    match body.get("success").and_then(Value::as_bool) {
        Some(true) => success(raw, body, requested),
        Some(false) => ParseResult::Failure(service_failure(body)),
        None => ParseResult::Failure(decode_failure(raw, "body has no boolean 'success' flag")),
    }
}

fn success(raw: &RawResponse, body: &Map<String, Value>, requested: &SchemaDescriptor) -> ParseResult {
    let parsed_data = match body.get("parsedData") {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(data)) => data.clone(),
        Some(_) => return ParseResult::Failure(decode_failure(raw, "'parsedData' is not an object")),
    };

    for key in parsed_data.keys().filter(|k| !requested.contains(k)) {
        warn!(field = %key, "Service returned a field the schema does not name");
    }

    let metadata = body
        .get("metadata")
        .and_then(Value::as_object)
        .map(read_metadata)
        .unwrap_or_default();

    ParseResult::Success(ParseSuccess {
        parsed_data,
        metadata,
        primary_failure: None,
    })
}

fn read_metadata(meta: &Map<String, Value>) -> ParseMetadata {
    let confidence = meta
        .get("confidence")
        .and_then(Value::as_f64)
        .filter(|c| c.is_finite())
        .map(|c| c.clamp(0.0, 1.0))
        .unwrap_or(0.0);

    let processing_ms = meta
        .get("processingTimeMs")
        .and_then(whole_number)
        .unwrap_or(0);

    ParseMetadata {
        confidence,
        processing_time: Duration::from_millis(processing_ms),
        tokens_used: meta.get("tokensUsed").and_then(whole_number).unwrap_or(0),
        request_id: meta
            .get("requestId")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        features: meta
            .get("features")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_str).map(str::to_string).collect())
            .unwrap_or_default(),
    }
}

/// Non-negative count; floats such as `311.0` are rounded
fn whole_number(value: &Value) -> Option<u64> {
    value
        .as_u64()
        .or_else(|| value.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f.round() as u64))
}

/// `success: false` inside a 2xx body
fn service_failure(body: &Map<String, Value>) -> ParseFailure {
    let error = body.get("error").and_then(Value::as_object);
    let code = error.and_then(|e| e.get("code")).and_then(Value::as_str).unwrap_or_default();
    let message = error
        .and_then(|e| e.get("message"))
        .and_then(Value::as_str)
        .unwrap_or("Parse failed without an error message");

    with_service_details(ParseFailure::new(ErrorKind::from_code(code), message), error)
}

/// Non-2xx response
fn http_failure(raw: &RawResponse) -> ParseFailure {
    let parsed: Option<Value> = serde_json::from_str(&raw.body).ok();
    let error = parsed
        .as_ref()
        .and_then(|b| b.get("error"))
        .and_then(Value::as_object);
    let body_kind = error
        .and_then(|e| e.get("code"))
        .and_then(Value::as_str)
        .map(ErrorKind::from_code)
        .filter(|k| *k != ErrorKind::UnknownError);

    let kind = match raw.status {
        401 => ErrorKind::AuthenticationError,
        403 => ErrorKind::QuotaExceededError,
        408 => ErrorKind::TimeoutError,
        429 => ErrorKind::RateLimitError,
        500 | 502 | 503 | 504 => ErrorKind::ServiceUnavailableError,
        400 | 422 => body_kind.unwrap_or(ErrorKind::InvalidInput),
        _ => ErrorKind::TransportError,
    };

    let message = error
        .and_then(|e| e.get("message"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {}", raw.status));

    let failure = ParseFailure::new(kind, message)
        .with_status(raw.status)
        .with_body(raw.body.clone());
    with_service_details(failure, error)
}

fn with_service_details(mut failure: ParseFailure, error: Option<&Map<String, Value>>) -> ParseFailure {
    let Some(error) = error else {
        return failure;
    };
    if let Some(details) = error.get("details").filter(|d| !d.is_null()) {
        failure = failure.with_details(details.clone());
    }
    let suggestion = error
        .get("suggestion")
        .or_else(|| error.get("details").and_then(|d| d.get("suggestion")))
        .and_then(Value::as_str);
    if let Some(suggestion) = suggestion {
        failure = failure.with_suggestion(suggestion);
    }
    failure
}

fn decode_failure(raw: &RawResponse, reason: impl Into<String>) -> ParseFailure {
    ParseFailure::new(ErrorKind::DecodeError, reason)
        .with_status(raw.status)
        .with_body(raw.body.clone())
}
