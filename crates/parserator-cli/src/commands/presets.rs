//! Presets command implementation.

use crate::cli::PresetsArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use parserator_domain::{get_preset, list_presets};

/// Execute the presets command.
pub fn execute_presets(args: PresetsArgs, formatter: &Formatter) -> Result<()> {
    println!("{}", render_presets(args.name.as_deref(), formatter)?);
    Ok(())
}

/// All presets, or one preset in detail.
pub fn render_presets(name: Option<&str>, formatter: &Formatter) -> Result<String> {
    match name {
        None => formatter.format_presets(list_presets()),
        Some(name) => {
            let preset = get_preset(name).ok_or_else(|| {
                let known: Vec<&str> = list_presets().iter().map(|p| p.name()).collect();
                CliError::InvalidInput(format!("Unknown preset '{}' (available: {})", name, known.join(", ")))
            })?;
            formatter.format_preset(preset)
        }
    }
}
