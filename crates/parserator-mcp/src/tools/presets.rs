//! Preset tools - list presets and parse with one

use crate::error::McpError;
use crate::protocol::ToolDefinition;
use parserator_domain::{get_preset, list_presets, ParseResult, Preset};
use parserator_sdk::{ParseratorClient, Transport};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Parameters for `parserator_parse_preset`
#[derive(Debug, Deserialize)]
pub struct ParsePresetParams {
    /// Raw input text
    pub text: String,
    /// Preset name, e.g. `invoice`
    pub preset: String,
}

/// One entry of `parserator_list_presets`
#[derive(Debug, Serialize)]
pub struct PresetSummary {
    /// Registry key
    pub name: String,
    /// Display name
    pub title: String,
    /// What the preset extracts
    pub description: String,
    /// Output schema in wire form
    pub schema: Value,
}

impl From<&Preset> for PresetSummary {
    fn from(preset: &Preset) -> Self {
        Self {
            name: preset.name().to_string(),
            title: preset.title().to_string(),
            description: preset.description().to_string(),
            schema: preset.schema().to_wire(),
        }
    }
}

/// Handle `parserator_list_presets`
pub fn handle_list_presets() -> Vec<PresetSummary> {
    list_presets().iter().map(PresetSummary::from).collect()
}

/// Handle `parserator_parse_preset`
pub async fn handle_parse_preset<T: Transport>(
    client: &ParseratorClient<T>,
    params: ParsePresetParams,
) -> Result<ParseResult, McpError> {
    if get_preset(&params.preset).is_none() {
        let known: Vec<&str> = list_presets().iter().map(|p| p.name()).collect();
        return Err(McpError::InvalidParams(format!(
            "unknown preset '{}' (available: {})",
            params.preset,
            known.join(", ")
        )));
    }
    Ok(client.parse_preset(&params.preset, &params.text, None).await)
}

/// Tool definition for `parserator_list_presets`
pub fn list_definition() -> ToolDefinition {
    ToolDefinition {
        name: "parserator_list_presets".to_string(),
        description: "List the built-in parsing presets and their schemas".to_string(),
        input_schema: json!({"type": "object", "properties": {}}),
    }
}

/// Tool definition for `parserator_parse_preset`
pub fn parse_definition() -> ToolDefinition {
    let names: Vec<&str> = list_presets().iter().map(|p| p.name()).collect();
    ToolDefinition {
        name: "parserator_parse_preset".to_string(),
        description: "Parse text with a built-in preset (email, invoice, contact and others)".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "text": {"type": "string", "description": "Text to parse"},
                "preset": {"type": "string", "enum": names, "description": "Preset name"}
            },
            "required": ["text", "preset"]
        }),
    }
}
