//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Parserator CLI - Turn unstructured text into structured JSON.
#[derive(Debug, Parser)]
#[command(name = "parserator")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Profile to use
    #[arg(short, long, global = true)]
    pub profile: Option<String>,

    /// API key (overrides the profile)
    #[arg(long, global = true, env = "PARSERATOR_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Service base URL (overrides the profile)
    #[arg(long, global = true, env = "PARSERATOR_BASE_URL")]
    pub base_url: Option<String>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Parse text into structured data
    Parse(ParseArgs),

    /// List presets, or show one preset's schema
    Presets(PresetsArgs),

    /// Check service health
    Health,

    /// Check an API key's format without calling the service
    ValidateKey(ValidateKeyArgs),

    /// Manage the configuration file
    Config(ConfigArgs),
}

/// Arguments for the parse command.
#[derive(Debug, Parser)]
pub struct ParseArgs {
    /// Output schema: a JSON object inline or a path to a JSON file
    #[arg(short, long, conflicts_with = "preset", required_unless_present = "preset")]
    pub schema: Option<String>,

    /// Use a built-in preset instead of a schema
    #[arg(long)]
    pub preset: Option<String>,

    /// Input file (reads stdin when omitted)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Extra instructions for the parser
    #[arg(long)]
    pub instructions: Option<String>,

    /// Schema to try when the primary schema fails
    #[arg(long, conflicts_with = "preset")]
    pub fallback_schema: Option<String>,

    /// Minimum confidence (0.0-1.0)
    #[arg(long)]
    pub confidence: Option<f64>,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,
}

/// Arguments for the presets command.
#[derive(Debug, Parser)]
pub struct PresetsArgs {
    /// Preset to show in detail
    pub name: Option<String>,
}

/// Arguments for the validate-key command.
#[derive(Debug, Parser)]
pub struct ValidateKeyArgs {
    /// API key to check
    pub key: String,
}

/// Arguments for configuration management.
#[derive(Debug, Parser)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Show the effective configuration (API key redacted)
    Show,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
        }
    }
}
