//! Configuration structures for chango settings.

use serde::{Deserialize, Serialize};

use crate::defaults;

/// Application configuration with nested sections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Undo/redo settings
    #[serde(default)]
    pub history: HistorySettings,

    /// Syntax highlighting settings
    #[serde(default)]
    pub highlight: HighlightSettings,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Undo/redo settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistorySettings {
    /// Edits closer together than this (ms) may merge into one undo step
    #[serde(default = "default_coalesce_window_ms")]
    pub coalesce_window_ms: u64,

    /// Maximum number of undo steps kept per document
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

/// Syntax highlighting settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighlightSettings {
    /// Color scheme for style tags (dark or light)
    #[serde(default = "default_color_scheme")]
    pub color_scheme: String,

    /// Use grammar-aware tokenizers when available
    #[serde(default = "default_precise_tokenizers")]
    pub precise_tokenizers: bool,

    /// Files larger than this (KB) skip the precise tokenizer
    #[serde(default = "default_large_file_threshold_kb")]
    pub large_file_threshold_kb: u64,
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log file path (optional)
    #[serde(default)]
    pub file_path: Option<String>,

    /// Minimum log level (debug, info, warn, error)
    #[serde(default = "default_min_level")]
    pub min_level: String,
}

// Default value functions for serde
fn default_coalesce_window_ms() -> u64 {
    defaults::COALESCE_WINDOW_MS
}

fn default_max_depth() -> usize {
    defaults::MAX_HISTORY_DEPTH
}

fn default_color_scheme() -> String {
    defaults::COLOR_SCHEME.to_string()
}

fn default_precise_tokenizers() -> bool {
    defaults::PRECISE_TOKENIZERS
}

fn default_large_file_threshold_kb() -> u64 {
    defaults::LARGE_FILE_THRESHOLD_KB
}

fn default_min_level() -> String {
    defaults::MIN_LOG_LEVEL.to_string()
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            coalesce_window_ms: default_coalesce_window_ms(),
            max_depth: default_max_depth(),
        }
    }
}

impl Default for HighlightSettings {
    fn default() -> Self {
        Self {
            color_scheme: default_color_scheme(),
            precise_tokenizers: default_precise_tokenizers(),
            large_file_threshold_kb: default_large_file_threshold_kb(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            file_path: None,
            min_level: default_min_level(),
        }
    }
}
