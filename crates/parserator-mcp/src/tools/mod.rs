//! MCP tool implementations

mod health;
mod parse;
mod presets;

pub use health::{definition as health_definition, handle_health, HealthResult};
pub use parse::{definition as parse_definition, handle_parse, ParseParams};
pub use presets::{
    handle_list_presets, handle_parse_preset, list_definition as list_presets_definition,
    parse_definition as parse_preset_definition, ParsePresetParams, PresetSummary,
};

use crate::error::McpError;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Deserialize tool arguments, reporting failures as invalid params
pub fn parse_params<P: DeserializeOwned>(arguments: Value) -> Result<P, McpError> {
    serde_json::from_value(arguments).map_err(|e| McpError::InvalidParams(e.to_string()))
}
