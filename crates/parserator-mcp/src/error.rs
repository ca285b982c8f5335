//! Error types for MCP server operations.

use parserator_sdk::SdkError;
use thiserror::Error;

/// MCP server error types
#[derive(Error, Debug)]
pub enum McpError {
    /// Malformed JSON-RPC envelope
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Unknown JSON-RPC method
    #[error("Method not found: {0}")]
    MethodNotFound(String),

    /// Unknown tool name
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Tool arguments missing or malformed
    #[error("Invalid params: {0}")]
    InvalidParams(String),

    /// Client construction or configuration failure
    #[error("Parserator error: {0}")]
    Sdk(#[from] SdkError),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl McpError {
    /// Convert to JSON-RPC error code
    pub fn error_code(&self) -> i32 {
        match self {
            McpError::InvalidRequest(_) => -32600,
            McpError::MethodNotFound(_) => -32601,
            McpError::ToolNotFound(_) => -32601,
            McpError::InvalidParams(_) => -32602,
            McpError::Json(_) => -32700,
            McpError::Sdk(_) | McpError::Io(_) => -32000,
        }
    }
}
