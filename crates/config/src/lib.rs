//! Configuration management for chango.
//!
//! This crate provides configuration loading, saving, and validation
//! with support for TOML format and XDG directory conventions.

mod settings;
mod xdg;

pub use settings::{Config, HighlightSettings, HistorySettings, LoggingSettings};
pub use xdg::{get_config_dir, get_data_dir};

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Default values as constants
pub mod defaults {
    pub const COALESCE_WINDOW_MS: u64 = 700;
    pub const MAX_HISTORY_DEPTH: usize = 100;
    pub const COLOR_SCHEME: &str = "dark";
    pub const PRECISE_TOKENIZERS: bool = true;
    pub const LARGE_FILE_THRESHOLD_KB: u64 = 512;
    pub const MIN_LOG_LEVEL: &str = "info";
    pub const MAX_LOG_ENTRIES: usize = 1000;
}

impl Config {
    /// Load configuration from the XDG config file.
    ///
    /// On first run, creates config file with default values.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    /// Load configuration from a specific file.
    ///
    /// Missing files are created with defaults. Missing keys are filled with
    /// defaults and the normalized file is written back.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = Self::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let original_content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config = Self::validate_content(&original_content)
            .with_context(|| format!("Invalid config: {}", path.display()))?;

        let normalized_content = toml::to_string_pretty(&config)?;
        if original_content != normalized_content {
            config.save_to(path)?;
        }

        Ok(config)
    }

    /// Save configuration to the XDG config file.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    /// Save configuration to a specific file.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }

    /// Get path to config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(get_config_dir()?.join("config.toml"))
    }

    /// Default log file location.
    pub fn default_log_path() -> Result<PathBuf> {
        Ok(get_data_dir()?.join("chango.log"))
    }

    /// Validate config content.
    pub fn validate_content(content: &str) -> Result<Config> {
        toml::from_str(content).map_err(|e| anyhow::anyhow!("{}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_first_load_writes_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config, Config::default());
        assert!(path.exists());
    }

    #[test]
    fn test_missing_keys_are_filled() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[history]\nmax_depth = 25\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.history.max_depth, 25);
        assert_eq!(
            config.history.coalesce_window_ms,
            defaults::COALESCE_WINDOW_MS
        );
        assert_eq!(config.highlight.color_scheme, "dark");

        let rewritten = std::fs::read_to_string(&path).unwrap();
        assert!(rewritten.contains("coalesce_window_ms = 700"));
        assert!(rewritten.contains("[logging]"));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.highlight.color_scheme = "light".to_string();
        config.highlight.precise_tokenizers = false;
        config.logging.file_path = Some("/tmp/chango.log".to_string());
        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_invalid_content_is_rejected() {
        assert!(Config::validate_content("[history]\nmax_depth = \"many\"\n").is_err());
        assert!(Config::validate_content("").is_ok());
    }
}
