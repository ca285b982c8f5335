//! MCP server implementation

use parserator_domain::ParseResult;
use parserator_sdk::{ClientConfig, HttpTransport, ParseratorClient, Transport};
use serde_json::{json, Value};
use std::io::{BufRead, Write};
use tokio::runtime::Runtime;
use tracing::{debug, error, info, warn};

use crate::error::McpError;
use crate::protocol::*;
use crate::tools;

/// MCP Server
///
/// Handles Model Context Protocol requests via stdio transport. Holds no
/// parsing logic: every tool call goes through the SDK client.
pub struct McpServer<T: Transport = HttpTransport> {
    client: ParseratorClient<T>,
    runtime: Runtime,
}

impl McpServer<HttpTransport> {
    /// Create a new MCP server talking to the service over HTTP
    ///
    /// # Arguments
    ///
    /// * `config` - Client configuration (base URL, API key, retries)
    pub fn new(config: ClientConfig) -> Result<Self, McpError> {
        Self::with_client(ParseratorClient::new(config)?)
    }
}

impl<T: Transport> McpServer<T> {
    /// Create a server around an existing client
    pub fn with_client(client: ParseratorClient<T>) -> Result<Self, McpError> {
        let runtime = Runtime::new()?;
        Ok(Self { client, runtime })
    }

    /// Run the MCP server (stdio transport)
    ///
    /// Reads JSON-RPC requests from stdin and writes responses to stdout.
    pub fn run(&self) -> Result<(), McpError> {
        let stdin = std::io::stdin();
        let stdout = std::io::stdout();
        self.run_with(stdin.lock(), stdout.lock())
    }

    /// Serve newline-delimited JSON-RPC from `reader` until it closes
    pub fn run_with<R: BufRead, W: Write>(&self, reader: R, mut writer: W) -> Result<(), McpError> {
        info!("MCP server started");

        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            if let Some(response) = self.handle_message(&line) {
                self.write_response(&mut writer, &response)?;
            }
        }

        info!("MCP server stopped");
        Ok(())
    }

    /// Handle one raw JSON-RPC message. Returns `None` for notifications.
    pub fn handle_message(&self, line: &str) -> Option<Value> {
        debug!("Received request: {}", line);

        let request: JsonRpcRequest = match serde_json::from_str(line) {
            Ok(req) => req,
            Err(e) => {
                error!("Failed to parse request: {}", e);
                let message = format!("Parse error: {}", e);
                let code = McpError::Json(e).error_code();
                return Some(JsonRpcError::new(None, code, message).into_value());
            }
        };

        if request.is_notification() {
            debug!(method = %request.method, "Notification received");
            return None;
        }

        Some(self.handle_request(request))
    }

    /// Handle a JSON-RPC request
    fn handle_request(&self, request: JsonRpcRequest) -> Value {
        let id = request.id.clone();

        if request.jsonrpc != "2.0" {
            let err = McpError::InvalidRequest(format!("unsupported jsonrpc version '{}'", request.jsonrpc));
            return JsonRpcError::new(id, err.error_code(), err.to_string()).into_value();
        }

        let result = match request.method.as_str() {
            "initialize" => self.handle_initialize(),
            "ping" => Ok(json!({})),
            "tools/list" => self.handle_tools_list(),
            "tools/call" => self.handle_tool_call(request.params),
            other => Err(McpError::MethodNotFound(other.to_string())),
        };

        match result {
            Ok(value) => JsonRpcResponse::new(id, value).into_value(),
            Err(e) => {
                warn!(code = e.error_code(), "Request failed: {}", e);
                JsonRpcError::new(id, e.error_code(), e.to_string()).into_value()
            }
        }
    }

    /// Handle initialize request
    fn handle_initialize(&self) -> Result<Value, McpError> {
        let response = InitializeResponse {
            protocol_version: PROTOCOL_VERSION.to_string(),
            server_info: ServerInfo {
                name: "parserator-mcp".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            capabilities: Capabilities {
                tools: ToolsCapability { list_changed: false },
            },
        };
        Ok(serde_json::to_value(response)?)
    }

    /// Handle tools/list request
    fn handle_tools_list(&self) -> Result<Value, McpError> {
        let response = ToolListResponse {
            tools: vec![
                tools::parse_definition(),
                tools::parse_preset_definition(),
                tools::list_presets_definition(),
                tools::health_definition(),
            ],
        };
        Ok(serde_json::to_value(response)?)
    }

    /// Handle tools/call request
    fn handle_tool_call(&self, params: Value) -> Result<Value, McpError> {
        let tool_name = params
            .get("name")
            .and_then(|v| v.as_str())
            .ok_or_else(|| McpError::InvalidParams("Missing tool name".to_string()))?;

        let arguments = match params.get("arguments") {
            Some(Value::Null) | None => json!({}),
            Some(args) => args.clone(),
        };

        debug!(tool = tool_name, "Calling tool");

        // Route to appropriate tool handler
        match tool_name {
            "parserator_parse" => {
                let params: tools::ParseParams = tools::parse_params(arguments)?;
                let result = self.runtime.block_on(tools::handle_parse(&self.client, params))?;
                Ok(parse_result(&result))
            }
            "parserator_parse_preset" => {
                let params: tools::ParsePresetParams = tools::parse_params(arguments)?;
                let result = self.runtime.block_on(tools::handle_parse_preset(&self.client, params))?;
                Ok(parse_result(&result))
            }
            "parserator_list_presets" => {
                let presets = tools::handle_list_presets();
                Ok(tool_result(json!({ "presets": serde_json::to_value(presets)? }), false))
            }
            "parserator_health" => {
                let health = self.runtime.block_on(tools::handle_health(&self.client));
                let healthy = health.healthy;
                Ok(tool_result(serde_json::to_value(health)?, !healthy))
            }
            other => Err(McpError::ToolNotFound(other.to_string())),
        }
    }

    /// Write response to the output stream
    fn write_response<W: Write>(&self, writer: &mut W, response: &Value) -> Result<(), McpError> {
        let response_str = serde_json::to_string(response)?;
        writeln!(writer, "{}", response_str)?;
        writer.flush()?;
        debug!("Sent response: {}", response_str);
        Ok(())
    }
}

fn parse_result(result: &ParseResult) -> Value {
    tool_result(result.to_json(), !result.is_success())
}
