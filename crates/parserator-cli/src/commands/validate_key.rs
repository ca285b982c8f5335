//! Validate-key command implementation.

use crate::cli::ValidateKeyArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use parserator_domain::validate_api_key;

/// Execute the validate-key command. Format check only; nothing is sent.
pub fn execute_validate_key(args: ValidateKeyArgs, formatter: &Formatter) -> Result<()> {
    check_key(&args.key)?;
    println!("{}", formatter.success("API key format is valid"));
    Ok(())
}

fn check_key(key: &str) -> Result<()> {
    if validate_api_key(key.trim()) {
        Ok(())
    } else {
        Err(CliError::InvalidInput(
            "API key must start with pk_live_ or pk_test_ followed by at least 20 letters or digits".into(),
        ))
    }
}
