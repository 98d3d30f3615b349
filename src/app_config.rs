use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs;
use std::path::Path;

use crate::document::LoaderOptions;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Config {
    /// Where and how patched documents are written
    #[serde(default)]
    pub output: OutputConfig,

    /// Element recognition settings
    #[serde(default)]
    pub loader: LoaderOptions,

    /// Translation sheet settings
    #[serde(default)]
    pub exchange: ExchangeConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Output settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct OutputConfig {
    // @field: Inserted before the extension of written files; empty overwrites the input
    #[serde(default)]
    pub suffix: String,

    // @field: Replace an existing output file other than the input itself
    #[serde(default)]
    pub force_overwrite: bool,
}

/// Translation sheet settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ExchangeConfig {
    // @field: Leave locked segments out of exported sheets
    #[serde(default = "default_true")]
    pub skip_locked: bool,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            skip_locked: default_true(),
        }
    }
}

/// Log level for the application
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;
        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Save configuration as pretty-printed JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write config to file: {}", path.display()))?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let suffix = &self.output.suffix;
        if suffix.contains('/') || suffix.contains('\\') {
            return Err(anyhow!("Output suffix must not contain path separators: {}", suffix));
        }
        if suffix.starts_with('.') || suffix.ends_with('.') {
            return Err(anyhow!("Output suffix must not start or end with a dot: {}", suffix));
        }
        Ok(())
    }
}
