//! Parse command implementation.

use crate::cli::ParseArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use parserator_domain::{get_preset, list_presets, ParseOptions, ParseRequest, ParseResult, SchemaDescriptor};
use parserator_sdk::{ParseratorClient, Transport};
use serde_json::Value;
use std::io::Read;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Execute the parse command.
pub async fn execute_parse<T: Transport>(
    args: ParseArgs,
    client: &ParseratorClient<T>,
    formatter: &Formatter,
) -> Result<()> {
    let input = read_input(args.input.as_deref())?;
    let result = run_parse(&args, input, client).await?;

    println!("{}", formatter.format_result(&result)?);

    match result.error_kind() {
        None => Ok(()),
        Some(kind) => Err(CliError::ParseFailed(kind.code().to_string())),
    }
}

/// Build the request described by `args` and send it.
///
/// Local mistakes (bad schema, unknown preset, out-of-range options) are
/// errors; anything the service says comes back as the result.
pub async fn run_parse<T: Transport>(
    args: &ParseArgs,
    input: String,
    client: &ParseratorClient<T>,
) -> Result<ParseResult> {
    let options = options_from_args(args);

    if let Some(name) = &args.preset {
        let preset = get_preset(name).ok_or_else(|| {
            let known: Vec<&str> = list_presets().iter().map(|p| p.name()).collect();
            CliError::InvalidInput(format!("Unknown preset '{}' (available: {})", name, known.join(", ")))
        })?;
        let request = preset.request(input, Some(&options))?;
        debug!(preset = preset.name(), "Parsing with preset");
        return Ok(client.parse_request(&request).await);
    }

    let schema_arg = args
        .schema
        .as_deref()
        .ok_or_else(|| CliError::InvalidInput("Either --schema or --preset is required".into()))?;
    let schema = load_schema(schema_arg)?;
    let fallback = args.fallback_schema.as_deref().map(load_schema).transpose()?;

    let request = ParseRequest::build(input, schema, args.instructions.as_deref(), Some(options))?;
    debug!(fields = request.schema().len(), fallback = fallback.is_some(), "Parsing with schema");
    Ok(client.parse_with_fallback(&request, fallback.as_ref()).await)
}

fn options_from_args(args: &ParseArgs) -> ParseOptions {
    let mut options = ParseOptions::new();
    if let Some(threshold) = args.confidence {
        options = options.with_confidence_threshold(threshold);
    }
    if let Some(secs) = args.timeout {
        options = options.with_timeout(Duration::from_secs(secs));
    }
    // Presets carry their own instructions; the flag extends them.
    if args.preset.is_some() {
        if let Some(extra) = &args.instructions {
            options = options.with_additional_instructions(extra.clone());
        }
    }
    options
}

/// Load a schema from inline JSON (`{...}`) or from a JSON file.
pub fn load_schema(arg: &str) -> Result<SchemaDescriptor> {
    let text = if arg.trim_start().starts_with('{') {
        arg.to_string()
    } else {
        std::fs::read_to_string(arg)
            .map_err(|e| CliError::InvalidInput(format!("Cannot read schema file '{}': {}", arg, e)))?
    };
    let value: Value = serde_json::from_str(&text)?;
    Ok(SchemaDescriptor::from_json(&value)?)
}

/// Read the text to parse from `path`, or from stdin when absent.
pub fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| CliError::InvalidInput(format!("Cannot read input file '{}': {}", path.display(), e))),
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}
