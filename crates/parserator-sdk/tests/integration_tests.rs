//! Integration tests for the Parserator SDK
//!
//! Each test starts an axum server on an ephemeral port that plays the
//! parsing service, then drives the real HTTP transport against it.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use parserator_domain::{ErrorKind, FieldType, ParseOptions, ParseRequest, SchemaDescriptor};
use parserator_sdk::{BatchOptions, ClientConfig, ParseratorClient};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Default)]
struct Service {
    hits: AtomicUsize,
    /// Answer 429 to this many requests before succeeding
    rate_limited: usize,
    /// Answer every request with this status and body instead
    fixed: Option<(u16, String)>,
    delay: Option<Duration>,
    auth_headers: Mutex<Vec<Option<String>>>,
    bodies: Mutex<Vec<Value>>,
}

async fn parse_handler(
    State(service): State<Arc<Service>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, String) {
    let hit = service.hits.fetch_add(1, Ordering::SeqCst);
    service.auth_headers.lock().unwrap().push(
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    );
    service.bodies.lock().unwrap().push(body.clone());

    if let Some(delay) = service.delay {
        tokio::time::sleep(delay).await;
    }
    if let Some((status, body)) = &service.fixed {
        return (StatusCode::from_u16(*status).unwrap(), body.clone());
    }
    if hit < service.rate_limited {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            json!({"success": false, "error": {"code": "RATE_LIMIT_EXCEEDED", "message": "slow down"}}).to_string(),
        );
    }

    let input = body["inputData"].as_str().unwrap_or_default();
    let name = input.split(',').next().unwrap_or_default().trim();
    let response = json!({
        "success": true,
        "parsedData": {"name": name},
        "metadata": {
            "confidence": 0.93,
            "processingTimeMs": 120,
            "tokensUsed": 42,
            "requestId": format!("req_{}", hit),
            "features": ["architect", "extractor"]
        }
    });
    (StatusCode::OK, response.to_string())
}

async fn health_handler(headers: HeaderMap) -> Json<Value> {
    let caller = if headers.contains_key("authorization") {
        "authenticated"
    } else {
        "anonymous"
    };
    Json(json!({"status": "healthy", "message": caller}))
}

async fn start(service: Service) -> (String, Arc<Service>) {
    let service = Arc::new(service);
    let app = Router::new()
        .route("/v1/parse", post(parse_handler))
        .route("/health", get(health_handler))
        .with_state(service.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), service)
}

fn config(base_url: &str) -> ClientConfig {
    ClientConfig::new(base_url)
        .with_api_key("pk_test_abcdefghijklmnopqrstuvwx")
        .with_backoff(1, 10)
}

fn schema() -> SchemaDescriptor {
    SchemaDescriptor::new([("name", FieldType::String), ("title", FieldType::String)]).unwrap()
}

#[tokio::test]
async fn test_parse_round_trip() {
    let (url, service) = start(Service::default()).await;
    let client = ParseratorClient::new(config(&url)).unwrap();

    let result = client.parse("Maria Garcia, CTO", &schema(), Some("People only")).await;

    assert!(result.is_success(), "{:?}", result);
    assert_eq!(result.parsed_data().unwrap()["name"], "Maria Garcia");
    let metadata = result.metadata().unwrap();
    assert_eq!(metadata.tokens_used, 42);
    assert_eq!(metadata.request_id, "req_0");
    assert_eq!(metadata.processing_time, Duration::from_millis(120));

    let body = service.bodies.lock().unwrap()[0].clone();
    assert_eq!(body["inputData"], "Maria Garcia, CTO");
    assert_eq!(body["outputSchema"], json!({"name": "string", "title": "string"}));
    assert_eq!(body["instructions"], "People only");
    assert!(body.get("options").is_none());
}

#[tokio::test]
async fn test_bearer_token_sent_when_configured() {
    let (url, service) = start(Service::default()).await;

    let client = ParseratorClient::new(config(&url)).unwrap();
    client.parse("Maria Garcia", &schema(), None).await;

    let anonymous = ParseratorClient::new(ClientConfig::new(&url)).unwrap();
    anonymous.parse("Maria Garcia", &schema(), None).await;

    let headers = service.auth_headers.lock().unwrap().clone();
    assert_eq!(headers[0].as_deref(), Some("Bearer pk_test_abcdefghijklmnopqrstuvwx"));
    assert_eq!(headers[1], None);
}

#[tokio::test]
async fn test_options_on_the_wire() {
    let (url, service) = start(Service::default()).await;
    let client = ParseratorClient::new(config(&url)).unwrap();
    let options = ParseOptions::new()
        .with_confidence_threshold(0.8)
        .with_timeout(Duration::from_secs(5))
        .with_preserve_formatting(true);
    let request = ParseRequest::build("Maria Garcia", schema(), None, Some(options)).unwrap();

    assert!(client.parse_request(&request).await.is_success());

    let body = service.bodies.lock().unwrap()[0].clone();
    assert_eq!(body["confidenceThreshold"], 0.8);
    assert_eq!(body["options"]["timeout"], 5000);
    assert_eq!(body["options"]["preserveFormatting"], true);
}

#[tokio::test]
async fn test_minimal_success_body() {
    let (url, _service) = start(Service {
        fixed: Some((200, r#"{"success":true,"parsedData":{"name":"Maria Garcia"}}"#.to_string())),
        ..Service::default()
    })
    .await;
    let client = ParseratorClient::new(config(&url)).unwrap();

    let result = client.parse("Maria Garcia", &schema(), None).await;

    assert_eq!(result.parsed_data().unwrap()["name"], "Maria Garcia");
    assert_eq!(result.metadata().unwrap().confidence, 0.0);
    assert_eq!(result.metadata().unwrap().tokens_used, 0);
}

#[tokio::test]
async fn test_rate_limit_retried_then_succeeds() {
    let (url, service) = start(Service {
        rate_limited: 2,
        ..Service::default()
    })
    .await;
    let client = ParseratorClient::new(config(&url).with_max_retries(3)).unwrap();

    let result = client.parse("Maria Garcia", &schema(), None).await;

    assert!(result.is_success());
    assert_eq!(service.hits.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_rate_limit_exhausts_retries() {
    let (url, service) = start(Service {
        rate_limited: usize::MAX,
        ..Service::default()
    })
    .await;
    let client = ParseratorClient::new(config(&url).with_max_retries(2)).unwrap();

    let result = client.parse("Maria Garcia", &schema(), None).await;

    let failure = result.failure_ref().unwrap();
    assert_eq!(failure.kind, ErrorKind::RateLimitError);
    assert_eq!(failure.status, Some(429));
    assert_eq!(service.hits.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_authentication_failure_not_retried() {
    let (url, service) = start(Service {
        fixed: Some((401, json!({"success": false, "error": {"code": "INVALID_API_KEY", "message": "bad key"}}).to_string())),
        ..Service::default()
    })
    .await;
    let client = ParseratorClient::new(config(&url)).unwrap();

    let result = client.parse("Maria Garcia", &schema(), None).await;

    let failure = result.failure_ref().unwrap();
    assert_eq!(failure.kind, ErrorKind::AuthenticationError);
    assert_eq!(failure.message, "bad key");
    assert_eq!(service.hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_html_error_page_keeps_body() {
    let (url, _service) = start(Service {
        fixed: Some((502, "<html>Bad Gateway</html>".to_string())),
        ..Service::default()
    })
    .await;
    let client = ParseratorClient::new(config(&url).with_max_retries(0)).unwrap();

    let result = client.parse("Maria Garcia", &schema(), None).await;

    let failure = result.failure_ref().unwrap();
    assert_eq!(failure.kind, ErrorKind::ServiceUnavailableError);
    assert_eq!(failure.body.as_deref(), Some("<html>Bad Gateway</html>"));
}

#[tokio::test]
async fn test_malformed_success_body_is_decode_error() {
    let (url, _service) = start(Service {
        fixed: Some((200, "definitely not json".to_string())),
        ..Service::default()
    })
    .await;
    let client = ParseratorClient::new(config(&url)).unwrap();

    let result = client.parse("Maria Garcia", &schema(), None).await;

    assert_eq!(result.error_kind(), Some(ErrorKind::DecodeError));
}

#[tokio::test]
async fn test_request_timeout() {
    let (url, _service) = start(Service {
        delay: Some(Duration::from_secs(2)),
        ..Service::default()
    })
    .await;
    let client = ParseratorClient::new(config(&url).with_max_retries(0)).unwrap();
    let options = ParseOptions::new().with_timeout(Duration::from_millis(200));
    let request = ParseRequest::build("Maria Garcia", schema(), None, Some(options)).unwrap();

    let result = client.parse_request(&request).await;

    assert_eq!(result.error_kind(), Some(ErrorKind::TimeoutError));
}

#[tokio::test]
async fn test_unreachable_service_is_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);
    let client = ParseratorClient::new(config(&url).with_max_retries(0)).unwrap();

    let result = client.parse("Maria Garcia", &schema(), None).await;

    assert_eq!(result.error_kind(), Some(ErrorKind::NetworkError));
}

#[tokio::test]
async fn test_health_check_is_unauthenticated() {
    let (url, _service) = start(Service::default()).await;
    let client = ParseratorClient::new(config(&url)).unwrap();

    let health = client.health_check().await;

    assert!(health.is_healthy());
    assert_eq!(health.message, "anonymous");
}

#[tokio::test]
async fn test_batch_over_http_keeps_order() {
    let (url, service) = start(Service {
        delay: Some(Duration::from_millis(20)),
        ..Service::default()
    })
    .await;
    let client = ParseratorClient::new(config(&url)).unwrap();
    let names = ["Ada Lovelace", "Grace Hopper", "Alan Turing", "Edsger Dijkstra", "Barbara Liskov"];
    let requests: Vec<ParseRequest> = names
        .iter()
        .map(|n| ParseRequest::build(format!("{}, engineer", n), schema(), None, None).unwrap())
        .collect();

    let report = client.parse_batch(&requests, BatchOptions::default()).await.unwrap();

    assert_eq!(report.succeeded, names.len());
    assert_eq!(report.tokens_used, 42 * names.len() as u64);
    for (result, name) in report.results.iter().zip(names) {
        assert_eq!(result.parsed_data().unwrap()["name"], name);
    }
    assert_eq!(service.hits.load(Ordering::SeqCst), names.len());
}

#[tokio::test]
async fn test_concurrent_parses_share_one_client() {
    let (url, service) = start(Service::default()).await;
    let client = Arc::new(ParseratorClient::new(config(&url)).unwrap());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let client = client.clone();
            tokio::spawn(async move { client.parse(&format!("Person {}, role", i), &schema(), None).await })
        })
        .collect();

    for handle in handles {
        assert!(handle.await.unwrap().is_success());
    }
    assert_eq!(service.hits.load(Ordering::SeqCst), 8);
}
