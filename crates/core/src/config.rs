//! Configuration management
//!
//! This module handles loading the kmsctl configuration file.
//! The configuration file is stored in TOML format at
//! `~/.config/kmsctl/config.toml`, or under `$KMSCTL_CONFIG_DIR` when set.
//! Every value is optional; command-line flags and environment variables
//! take precedence over it.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Current configuration schema version
pub const SCHEMA_VERSION: u32 = 1;

/// Environment variable overriding the configuration directory
pub const CONFIG_DIR_ENV: &str = "KMSCTL_CONFIG_DIR";

/// Region used when neither flags, environment nor config name one
pub const DEFAULT_REGION: &str = "eu-west-1";

/// Directory downloads land in by default
pub const DEFAULT_OUTPUT_DIR: &str = "./secrets";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Schema version for migration support
    pub schema_version: u32,

    /// Default settings
    #[serde(default)]
    pub defaults: Defaults,
}

/// Defaults applied when a flag is not given
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Defaults {
    /// AWS region
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// Named credentials profile
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,

    /// Shared credentials file path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<String>,

    /// Custom S3/KMS endpoint URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Bucket holding the secrets
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,

    /// Download directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<String>,

    /// Output format: text, json or yaml
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Editor command for inline edits
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            defaults: Defaults::default(),
        }
    }
}

impl Config {
    /// Region to use, falling back to the built-in default
    pub fn region(&self) -> &str {
        self.defaults.region.as_deref().unwrap_or(DEFAULT_REGION)
    }

    /// Output directory to use, falling back to the built-in default
    pub fn output_dir(&self) -> &str {
        self.defaults
            .output_dir
            .as_deref()
            .unwrap_or(DEFAULT_OUTPUT_DIR)
    }

    /// Validate values that can be checked without network access
    pub fn validate(&self) -> Result<()> {
        if let Some(endpoint) = &self.defaults.endpoint {
            url::Url::parse(endpoint)?;
        }
        if let Some(format) = &self.defaults.format {
            if !matches!(format.as_str(), "text" | "json" | "yaml" | "yml") {
                return Err(Error::Config(format!("unsupported output format: {format}")));
            }
        }
        Ok(())
    }
}

/// Configuration manager locates and loads the config file
#[derive(Debug)]
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager with the default config path
    pub fn new() -> Result<Self> {
        let config_dir = match std::env::var_os(CONFIG_DIR_ENV) {
            Some(dir) => PathBuf::from(dir),
            None => dirs::config_dir()
                .ok_or_else(|| Error::Config("could not determine config directory".into()))?
                .join("kmsctl"),
        };
        Ok(Self::in_dir(&config_dir))
    }

    fn in_dir(dir: &Path) -> Self {
        Self {
            config_path: dir.join("config.toml"),
        }
    }

    /// Load configuration from disk
    ///
    /// If the configuration file doesn't exist, returns a default configuration.
    pub fn load(&self) -> Result<Config> {
        if !self.config_path.exists() {
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&self.config_path)?;
        let config: Config = toml::from_str(&content)?;

        if config.schema_version > SCHEMA_VERSION {
            return Err(Error::Config(format!(
                "configuration file version {} is newer than supported version {}, please upgrade kmsctl",
                config.schema_version, SCHEMA_VERSION
            )));
        }

        config.validate()?;
        Ok(config)
    }
}
