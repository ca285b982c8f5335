//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use parserator_sdk::{ClientConfig, ParseratorClient};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// CLI configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name
    #[serde(default = "default_profile")]
    pub active_profile: String,

    /// Available profiles, each a full client configuration
    #[serde(default)]
    pub profiles: BTreeMap<String, ClientConfig>,

    /// Global settings
    #[serde(default)]
    pub settings: Settings,
}

/// Global CLI settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
}

/// Values that take precedence over the active profile.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// Profile name from `--profile`
    pub profile: Option<String>,
    /// API key from `--api-key` or `PARSERATOR_API_KEY`
    pub api_key: Option<String>,
    /// Base URL from `--base-url` or `PARSERATOR_BASE_URL`
    pub base_url: Option<String>,
}

impl Config {
    /// Get the default configuration file path.
    pub fn path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".parserator").join("config.toml"))
    }

    /// Load configuration from `path`, or defaults if the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        for (name, profile) in &config.profiles {
            profile
                .validate()
                .map_err(|e| CliError::Config(format!("Profile '{}': {}", name, e)))?;
        }
        debug!(path = %path.display(), profiles = config.profiles.len(), "Loaded config");
        Ok(config)
    }

    /// Save configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Get the active profile.
    pub fn get_active_profile(&self) -> Result<&ClientConfig> {
        self.profiles
            .get(&self.active_profile)
            .ok_or_else(|| CliError::Config(format!("Profile '{}' not found", self.active_profile)))
    }

    /// Client configuration after applying flag and environment overrides.
    pub fn resolve(&self, overrides: &Overrides) -> Result<ClientConfig> {
        let mut config = match &overrides.profile {
            Some(name) => self
                .profiles
                .get(name)
                .ok_or_else(|| CliError::Config(format!("Profile '{}' does not exist", name)))?
                .clone(),
            None => self.get_active_profile()?.clone(),
        };

        if let Some(base_url) = &overrides.base_url {
            config.base_url = base_url.clone();
        }
        if let Some(api_key) = overrides.api_key.as_deref().filter(|k| !k.trim().is_empty()) {
            config.api_key = Some(api_key.to_string());
        }

        config.validate().map_err(CliError::Config)?;
        Ok(config)
    }

    /// HTTP client for the resolved configuration.
    pub fn client(&self, overrides: &Overrides) -> Result<ParseratorClient> {
        Ok(ParseratorClient::new(self.resolve(overrides)?)?)
    }
}

impl Default for Config {
    fn default() -> Self {
        let mut profiles = BTreeMap::new();
        profiles.insert("default".to_string(), ClientConfig::default());

        Self {
            active_profile: "default".to_string(),
            profiles,
            settings: Settings::default(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
        }
    }
}

fn default_profile() -> String {
    "default".to_string()
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}
