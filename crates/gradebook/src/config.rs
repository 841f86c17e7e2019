//! Configuration file support for gradebook.
//!
//! Loads configuration from `~/.config/gradebook/config.toml` unless another
//! file is given on the command line.

use anyhow::{Context, Result};
use gradebook_logging::LogFormat;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// The config directory name under the platform config dir
pub const CONFIG_DIR: &str = "gradebook";

/// The config file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Default tracing level when neither the CLI nor the config sets one
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Application configuration loaded from `config.toml`
#[derive(Debug, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Location of the grades database file
    pub database_path: Option<PathBuf>,
    /// Tracing filter level (e.g. "info", "debug")
    pub log_level: Option<String>,
    /// Console log format
    pub log_format: Option<LogFormat>,
    /// Directory for JSON log files; no file logging when unset
    #[serde(alias = "log_file")]
    pub log_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Default config file location.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE_NAME))
    }

    /// Load configuration from a specific file.
    ///
    /// Returns:
    /// - `Ok(Some(config))` if file exists and parses successfully
    /// - `Ok(None)` if file does not exist
    /// - `Err(...)` if file exists but fails to parse (hard error)
    pub fn load_from(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let config: AppConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        Ok(Some(config))
    }

    /// Load the explicit config file, or the default one if present.
    ///
    /// An explicit path that does not exist is an error; a missing default
    /// file just means defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load_from(path)?
                .with_context(|| format!("Config file not found: {}", path.display())),
            None => match Self::default_path() {
                Some(path) => Ok(Self::load_from(&path)?.unwrap_or_default()),
                None => Ok(Self::default()),
            },
        }
    }

    /// Get the effective database path.
    /// Priority: CLI flag > config file > platform data dir
    pub fn database_path(&self, cli: Option<&Path>) -> PathBuf {
        cli.map(Path::to_path_buf)
            .or_else(|| self.database_path.clone())
            .unwrap_or_else(gradebook_db::Database::default_path)
    }

    /// Get the effective log level.
    /// Priority: CLI flag > config file > "warn"
    pub fn log_level<'a>(&'a self, cli: Option<&'a str>) -> &'a str {
        cli.or(self.log_level.as_deref())
            .unwrap_or(DEFAULT_LOG_LEVEL)
    }

    /// Get the effective log format.
    /// Priority: CLI flag > config file > pretty
    pub fn log_format(&self, cli: Option<LogFormat>) -> LogFormat {
        cli.or(self.log_format).unwrap_or_default()
    }
}
