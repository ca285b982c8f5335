//! Config command implementation.

use crate::cli::{ConfigAction, ConfigArgs};
use crate::config::{Config, Overrides};
use crate::error::{CliError, Result};
use crate::output::Formatter;
use std::path::Path;

/// Execute the config command.
pub fn execute_config(
    args: ConfigArgs,
    config: &Config,
    overrides: &Overrides,
    path: &Path,
    formatter: &Formatter,
) -> Result<()> {
    match args.action {
        ConfigAction::Show => {
            let profile = overrides.profile.as_deref().unwrap_or(&config.active_profile);
            let client_config = config.resolve(overrides)?;
            println!("{}", formatter.info(&format!("Config file: {}", path.display())));
            println!("{}", formatter.format_config(profile, &client_config)?);
            Ok(())
        }
        ConfigAction::Init { force } => {
            init_config(path, force)?;
            println!("{}", formatter.success(&format!("Wrote default configuration to {}", path.display())));
            Ok(())
        }
    }
}

/// Write a default configuration file, refusing to clobber one unless forced.
pub fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(CliError::Config(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }
    Config::default().save_to(path)
}
