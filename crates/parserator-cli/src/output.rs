//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use parserator_domain::{FieldSpec, ParseFailure, ParseResult, Preset, SchemaDescriptor};
use parserator_sdk::{ClientConfig, HealthStatus};
use serde_json::{json, Value};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Selected output format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Format a parse result.
    pub fn format_result(&self, result: &ParseResult) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&result.to_json())?),
            OutputFormat::Table => Ok(self.format_result_table(result)),
        }
    }

    fn format_result_table(&self, result: &ParseResult) -> String {
        match result {
            ParseResult::Success(success) => {
                let mut lines = Vec::new();
                if let Some(primary) = &success.primary_failure {
                    lines.push(self.warning(&format!(
                        "Primary schema failed ({}), showing fallback result",
                        primary.kind
                    )));
                }

                if success.parsed_data.is_empty() {
                    lines.push(self.colorize("No fields extracted.", "yellow"));
                } else {
                    let mut builder = Builder::default();
                    builder.push_record(["Field", "Value"]);
                    for (field, value) in &success.parsed_data {
                        builder.push_record([field.clone(), display_value(value)]);
                    }
                    lines.push(rounded(builder));
                }

                let meta = &success.metadata;
                let mut summary = format!(
                    "Confidence: {:.2}  Tokens: {}  Time: {}ms",
                    meta.confidence,
                    meta.tokens_used,
                    meta.processing_time.as_millis()
                );
                if !meta.request_id.is_empty() {
                    summary.push_str(&format!("  Request: {}", meta.request_id));
                }
                lines.push(self.info(&summary));
                lines.join("\n")
            }
            ParseResult::Failure(failure) => self.format_failure(failure),
        }
    }

    fn format_failure(&self, failure: &ParseFailure) -> String {
        let mut lines = vec![self.error(&format!("{}: {}", failure.kind, failure.message))];
        if let Some(status) = failure.status {
            lines.push(format!("  HTTP status: {}", status));
        }
        if let Some(suggestion) = &failure.recovery_suggestion {
            lines.push(self.info(suggestion));
        }
        if let Some(fallback) = &failure.fallback_failure {
            lines.push(self.error(&format!("Fallback {}: {}", fallback.kind, fallback.message)));
        }
        lines.join("\n")
    }

    /// Format the preset registry.
    pub fn format_presets(&self, presets: &[Preset]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let list: Vec<Value> = presets.iter().map(preset_json).collect();
                Ok(serde_json::to_string_pretty(&list)?)
            }
            OutputFormat::Table => {
                let mut builder = Builder::default();
                builder.push_record(["Name", "Title", "Fields", "Description"]);
                for preset in presets {
                    builder.push_record([
                        preset.name().to_string(),
                        preset.title().to_string(),
                        preset.schema().len().to_string(),
                        preset.description().to_string(),
                    ]);
                }
                Ok(rounded(builder))
            }
        }
    }

    /// Format one preset with its schema.
    pub fn format_preset(&self, preset: &Preset) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&preset_json(preset))?),
            OutputFormat::Table => {
                let mut builder = Builder::default();
                builder.push_record(["Field", "Type"]);
                let mut rows = Vec::new();
                flatten_schema(preset.schema(), "", &mut rows);
                for (field, tag) in rows {
                    builder.push_record([field, tag.to_string()]);
                }

                let header = self.colorize(&format!("{} ({})", preset.title(), preset.name()), "cyan");
                Ok(format!(
                    "{}\n{}\n{}\nInstructions: {}",
                    header,
                    preset.description(),
                    rounded(builder),
                    preset.instructions()
                ))
            }
        }
    }

    /// Format a health probe.
    pub fn format_health(&self, health: &HealthStatus, base_url: &str) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&json!({
                "baseUrl": base_url,
                "healthy": health.is_healthy(),
                "status": health.status,
                "message": health.message,
            }))?),
            OutputFormat::Table => {
                let mut text = format!("{} is {}", base_url, health.status);
                if !health.message.is_empty() {
                    text.push_str(&format!(" ({})", health.message));
                }
                if health.is_healthy() {
                    Ok(self.success(&text))
                } else {
                    Ok(self.error(&text))
                }
            }
        }
    }

    /// Format the effective client configuration; the API key is redacted.
    pub fn format_config(&self, profile: &str, config: &ClientConfig) -> Result<String> {
        let api_key = config.api_key.as_deref().map(redact_key);
        let deadline = config.overall_deadline_secs;
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&json!({
                "profile": profile,
                "baseUrl": config.base_url,
                "apiKey": api_key,
                "timeoutSecs": config.timeout_secs,
                "maxRetries": config.max_retries,
                "backoff": {
                    "baseDelayMs": config.backoff.base_delay_ms,
                    "maxDelayMs": config.backoff.max_delay_ms,
                },
                "overallDeadlineSecs": deadline,
            }))?),
            OutputFormat::Table => {
                let mut builder = Builder::default();
                builder.push_record(["Setting", "Value"]);
                builder.push_record(["profile".to_string(), profile.to_string()]);
                builder.push_record(["base_url".to_string(), config.base_url.clone()]);
                builder.push_record(["api_key".to_string(), api_key.unwrap_or_else(|| "(none)".to_string())]);
                builder.push_record(["timeout_secs".to_string(), config.timeout_secs.to_string()]);
                builder.push_record(["max_retries".to_string(), config.max_retries.to_string()]);
                builder.push_record([
                    "backoff".to_string(),
                    format!("{}ms..{}ms", config.backoff.base_delay_ms, config.backoff.max_delay_ms),
                ]);
                builder.push_record([
                    "overall_deadline_secs".to_string(),
                    deadline.map(|d| d.to_string()).unwrap_or_else(|| "(none)".to_string()),
                ]);
                Ok(rounded(builder))
            }
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            _ => text.to_string(),
        }
    }
}

fn rounded(builder: Builder) -> String {
    let mut table = builder.build();
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));
    table.to_string()
}

/// Strings print bare; everything else as compact JSON.
fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "-".to_string(),
        other => other.to_string(),
    }
}

fn preset_json(preset: &Preset) -> Value {
    json!({
        "name": preset.name(),
        "title": preset.title(),
        "description": preset.description(),
        "instructions": preset.instructions(),
        "schema": preset.schema().to_wire(),
    })
}

/// Dotted field paths with their type tags, in schema order.
fn flatten_schema(schema: &SchemaDescriptor, prefix: &str, rows: &mut Vec<(String, &'static str)>) {
    for (name, spec) in schema.fields() {
        let path = if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", prefix, name)
        };
        match spec {
            FieldSpec::Leaf(field_type) => rows.push((path, field_type.as_str())),
            FieldSpec::Nested(inner) => flatten_schema(inner, &path, rows),
        }
    }
}

/// Keep the key's prefix and last four characters.
fn redact_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 12 {
        return "****".to_string();
    }
    let head: String = chars[..8].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}****{}", head, tail)
}
