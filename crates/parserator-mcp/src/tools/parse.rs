//! Parse tool - extract structured data from text with a caller schema

use crate::error::McpError;
use crate::protocol::ToolDefinition;
use parserator_domain::{FieldType, ParseRequest, ParseResult, SchemaDescriptor};
use parserator_sdk::{ParseratorClient, Transport};
use serde::Deserialize;
use serde_json::{json, Value};

/// Parameters for `parserator_parse`
#[derive(Debug, Deserialize)]
pub struct ParseParams {
    /// Raw input text
    pub text: String,
    /// Output schema: field name to type tag, nested objects allowed
    pub schema: Value,
    /// Extra instructions for the service
    #[serde(default)]
    pub context: Option<String>,
    /// Schema to try when the primary schema fails
    #[serde(default)]
    pub fallback_schema: Option<Value>,
}

fn schema_arg(name: &str, value: &Value) -> Result<SchemaDescriptor, McpError> {
    SchemaDescriptor::from_json(value).map_err(|e| McpError::InvalidParams(format!("{}: {}", name, e)))
}

/// Handle `parserator_parse`.
///
/// A malformed schema is an invalid-params error. Everything after that,
/// including blank text and service failures, comes back as the
/// normalized result JSON.
pub async fn handle_parse<T: Transport>(
    client: &ParseratorClient<T>,
    params: ParseParams,
) -> Result<ParseResult, McpError> {
    let schema = schema_arg("schema", &params.schema)?;
    let fallback = params
        .fallback_schema
        .as_ref()
        .map(|s| schema_arg("fallback_schema", s))
        .transpose()?;

    let request = match ParseRequest::build(params.text, schema, params.context.as_deref(), None) {
        Ok(request) => request,
        Err(e) => return Ok(ParseResult::failure(e.kind(), e.to_string())),
    };

    Ok(client.parse_with_fallback(&request, fallback.as_ref()).await)
}

/// Tool definition for `tools/list`
pub fn definition() -> ToolDefinition {
    let type_tags: Vec<&str> = FieldType::ALL.iter().map(|t| t.as_str()).collect();
    ToolDefinition {
        name: "parserator_parse".to_string(),
        description: "Extract structured JSON from unstructured text using a field schema".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "text": {"type": "string", "description": "Text to parse (at most 100,000 characters)"},
                "schema": {
                    "type": "object",
                    "description": format!("Field name to type tag ({}); nested objects allowed", type_tags.join(", ")),
                },
                "context": {"type": "string", "description": "Extra instructions for the parser"},
                "fallback_schema": {"type": "object", "description": "Simpler schema tried if the primary fails"}
            },
            "required": ["text", "schema"]
        }),
    }
}
