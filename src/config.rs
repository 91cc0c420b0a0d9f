//! Configuration management for the application.
//!
//! This module handles loading, validating, and saving application configuration
//! in TOML format with platform-specific directory resolution.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::{APP_NAME, DEFAULT_COALESCE_WINDOW_MS, DEFAULT_HISTORY_LIMIT};
use crate::models::RackView;

/// Path configuration for file system locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PathConfig {
    /// Directory holding the persisted editing session (defaults to `<config dir>/session`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_dir: Option<PathBuf>,
}

impl PathConfig {
    /// Session directory, falling back to the platform default.
    pub fn session_dir(&self) -> Result<PathBuf> {
        match &self.session_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(Config::config_dir()?.join("session")),
        }
    }
}

/// Command log settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Maximum number of undo steps kept
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    /// Repeated edits of the same target within this window merge into one step
    #[serde(default = "default_coalesce_window_ms")]
    pub coalesce_window_ms: u64,
}

const fn default_history_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}

const fn default_coalesce_window_ms() -> u64 {
    DEFAULT_COALESCE_WINDOW_MS
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_limit: default_history_limit(),
            coalesce_window_ms: default_coalesce_window_ms(),
        }
    }
}

/// UI preferences configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct UiConfig {
    /// Rack side shown when a layout is opened
    #[serde(default)]
    pub default_view: RackView,
}

/// Application configuration.
///
/// # File Location
///
/// - Linux: `~/.config/RackPlan/config.toml`
/// - macOS: `~/Library/Application Support/RackPlan/config.toml`
/// - Windows: `%APPDATA%\RackPlan\config.toml`
///
/// # Validation
///
/// - `history_limit` must be at least 1
/// - `session_dir`, if set, must not point at an existing file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    /// File system paths
    #[serde(default)]
    pub paths: PathConfig,
    /// Command log settings
    #[serde(default)]
    pub editor: EditorConfig,
    /// UI preferences
    #[serde(default)]
    pub ui: UiConfig,
}

impl Config {
    /// Creates a new Config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the platform-specific config directory path.
    ///
    /// - Linux: `~/.config/RackPlan/`
    /// - macOS: `~/Library/Application Support/RackPlan/`
    /// - Windows: `%APPDATA%\RackPlan\`
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to determine config directory")?
            .join(APP_NAME);

        Ok(config_dir)
    }

    /// Gets the full path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Loads configuration from the platform config file.
    ///
    /// If the file doesn't exist, returns default configuration.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    /// Loads configuration from an explicit path.
    ///
    /// If the file doesn't exist, returns default configuration.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::new());
        }

        let content = fs::read_to_string(config_path).context(format!(
            "Failed to read config file: {}",
            config_path.display()
        ))?;

        let config: Self = toml::from_str(&content).context(format!(
            "Failed to parse config file: {}",
            config_path.display()
        ))?;

        config.validate()?;
        Ok(config)
    }

    /// Saves configuration to the platform config file.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    /// Saves configuration to an explicit path using atomic write.
    ///
    /// Uses temp file + rename pattern for atomic writes.
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        self.validate()?;

        if let Some(config_dir) = config_path.parent() {
            fs::create_dir_all(config_dir).context(format!(
                "Failed to create config directory: {}",
                config_dir.display()
            ))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;
        let temp_path = config_path.with_extension("toml.tmp");

        fs::write(&temp_path, content).context(format!(
            "Failed to write temp config file: {}",
            temp_path.display()
        ))?;

        fs::rename(&temp_path, config_path).context(format!(
            "Failed to rename temp config file to: {}",
            config_path.display()
        ))?;

        Ok(())
    }

    /// Validates configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.editor.history_limit == 0 {
            anyhow::bail!("editor.history_limit must be at least 1");
        }

        if let Some(dir) = &self.paths.session_dir {
            if dir.is_file() {
                anyhow::bail!(
                    "Session directory path points at a file: {}",
                    dir.display()
                );
            }
        }

        Ok(())
    }
}
