//! Health command implementation.

use crate::error::{CliError, Result};
use crate::output::Formatter;
use parserator_sdk::{ParseratorClient, Transport};

/// Execute the health command.
///
/// Prints the probe result; an unhealthy service is an error so the
/// process exits non-zero.
pub async fn execute_health<T: Transport>(client: &ParseratorClient<T>, formatter: &Formatter) -> Result<()> {
    let health = client.health_check().await;
    println!("{}", formatter.format_health(&health, client.config().normalized_base_url())?);

    if health.is_healthy() {
        Ok(())
    } else {
        Err(CliError::Unhealthy(health.status))
    }
}
