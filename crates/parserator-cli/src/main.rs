//! Parserator CLI - Command-line interface for the Parserator parsing service.

use clap::Parser;
use parserator_cli::commands;
use parserator_cli::{Cli, Command, Config, Formatter, Overrides};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> parserator_cli::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays clean for JSON output
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    let path = match cli.config {
        Some(path) => path,
        None => Config::path()?,
    };
    let config = Config::load_from(&path)?;

    let overrides = Overrides {
        profile: cli.profile,
        api_key: cli.api_key,
        base_url: cli.base_url,
    };

    // Determine output format
    let format = cli.format.map(Into::into).unwrap_or(config.settings.format);

    // Determine color setting
    let color_enabled = !cli.no_color && config.settings.color;

    let formatter = Formatter::new(format, color_enabled);

    match cli.command {
        Command::Presets(args) => commands::execute_presets(args, &formatter),
        Command::ValidateKey(args) => commands::execute_validate_key(args, &formatter),
        Command::Config(args) => commands::execute_config(args, &config, &overrides, &path, &formatter),
        Command::Parse(args) => {
            let client = config.client(&overrides)?;
            let result = commands::execute_parse(args, &client, &formatter).await;
            client.close();
            result
        }
        Command::Health => {
            let client = config.client(&overrides)?;
            let result = commands::execute_health(&client, &formatter).await;
            client.close();
            result
        }
    }
}
