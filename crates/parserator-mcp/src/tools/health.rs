//! Health tool - probe the parsing service

use crate::protocol::ToolDefinition;
use parserator_sdk::{ParseratorClient, Transport};
use serde::Serialize;
use serde_json::json;

/// Result of `parserator_health`
#[derive(Debug, Serialize)]
pub struct HealthResult {
    /// Whether the service reported itself healthy
    pub healthy: bool,
    /// Status string from the service, or `error`
    pub status: String,
    /// Detail
    pub message: String,
}

/// Handle `parserator_health`
pub async fn handle_health<T: Transport>(client: &ParseratorClient<T>) -> HealthResult {
    let health = client.health_check().await;
    HealthResult {
        healthy: health.is_healthy(),
        status: health.status,
        message: health.message,
    }
}

/// Tool definition for `tools/list`
pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: "parserator_health".to_string(),
        description: "Check whether the Parserator service is reachable and healthy".to_string(),
        input_schema: json!({"type": "object", "properties": {}}),
    }
}
