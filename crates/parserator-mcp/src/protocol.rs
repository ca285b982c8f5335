//! MCP protocol types (JSON-RPC 2.0)

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// MCP protocol revision this server speaks
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// JSON-RPC request
#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    /// JSON-RPC version (must be "2.0")
    pub jsonrpc: String,
    /// Request ID; absent for notifications
    #[serde(default)]
    pub id: Option<Value>,
    /// Method name
    pub method: String,
    /// Method parameters
    #[serde(default)]
    pub params: Value,
}

impl JsonRpcRequest {
    /// Any request without an id is a notification and gets no response
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// JSON-RPC response (success)
#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    /// JSON-RPC version (must be "2.0")
    pub jsonrpc: String,
    /// Request ID
    pub id: Option<Value>,
    /// Result data
    pub result: Value,
}

/// JSON-RPC error response
#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    /// JSON-RPC version (must be "2.0")
    pub jsonrpc: String,
    /// Request ID
    pub id: Option<Value>,
    /// Error details
    pub error: ErrorDetail,
}

/// Error detail structure
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    /// Error code
    pub code: i32,
    /// Error message
    pub message: String,
}

impl JsonRpcResponse {
    /// Create a new success response
    pub fn new(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result,
        }
    }

    /// Wire form
    pub fn into_value(self) -> Value {
        json!({"jsonrpc": self.jsonrpc, "id": self.id, "result": self.result})
    }
}

impl JsonRpcError {
    /// Create a new error response
    pub fn new(id: Option<Value>, code: i32, message: String) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            error: ErrorDetail { code, message },
        }
    }

    /// Wire form
    pub fn into_value(self) -> Value {
        json!({
            "jsonrpc": self.jsonrpc,
            "id": self.id,
            "error": {"code": self.error.code, "message": self.error.message},
        })
    }
}

/// MCP tool list response
#[derive(Debug, Serialize)]
pub struct ToolListResponse {
    /// Available tools
    pub tools: Vec<ToolDefinition>,
}

/// Tool definition
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    /// Tool name
    pub name: String,
    /// Tool description
    pub description: String,
    /// Input schema (JSON Schema)
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// MCP server info
#[derive(Debug, Serialize)]
pub struct ServerInfo {
    /// Server name
    pub name: String,
    /// Server version
    pub version: String,
}

/// Initialize response
#[derive(Debug, Serialize)]
pub struct InitializeResponse {
    /// Protocol version
    #[serde(rename = "protocolVersion")]
    pub protocol_version: String,
    /// Server info
    #[serde(rename = "serverInfo")]
    pub server_info: ServerInfo,
    /// Capabilities
    pub capabilities: Capabilities,
}

/// Server capabilities
#[derive(Debug, Serialize)]
pub struct Capabilities {
    /// Tools capability
    pub tools: ToolsCapability,
}

/// Tools capability
#[derive(Debug, Serialize)]
pub struct ToolsCapability {
    /// Whether the tool list can change while connected
    #[serde(rename = "listChanged")]
    pub list_changed: bool,
}

/// Result of `tools/call`: the payload as text content plus structured JSON
pub fn tool_result(payload: Value, is_error: bool) -> Value {
    let text = serde_json::to_string_pretty(&payload).unwrap_or_else(|_| payload.to_string());
    json!({
        "content": [{"type": "text", "text": text}],
        "structuredContent": payload,
        "isError": is_error,
    })
}
