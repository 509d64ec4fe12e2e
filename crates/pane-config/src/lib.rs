//! Windowpane configuration system
//!
//! Compositor settings load from `windowpane.toml`, with environment variables
//! taking precedence. Level descriptions (layers and windowpane entities) live
//! in [`level`].

use serde::{Deserialize, Serialize};
use std::path::Path;

pub mod level;

pub use level::{AttrValue, EntityData, LayerData, LevelData};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PaneConfig {
    /// Shared off-screen target and layer policy settings
    pub compositor: CompositorConfig,
    /// Log output settings
    pub logging: LoggingConfig,
}

/// Compositor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositorConfig {
    /// Logical width of every group target, independent of display resolution
    pub target_width: u32,
    /// Logical height of every group target
    pub target_height: u32,
    /// Prefix for target debug labels; the group key is appended
    pub target_label_prefix: String,
    /// Layers carrying this tag are only ever drawn through windowpanes
    pub exclusive_tag: String,
    /// Draw depth for windowpanes that don't specify one
    pub default_depth: i32,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is unset (e.g. "info", "windowpane=debug")
    pub filter: String,
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self {
            target_width: 320,
            target_height: 180,
            target_label_prefix: "windowpane-".to_string(),
            exclusive_tag: "windowpanehelperonly".to_string(),
            default_depth: 11000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

impl PaneConfig {
    /// Load configuration from a TOML file
    ///
    /// # Returns
    /// * `Ok(PaneConfig)` - Successfully loaded configuration
    /// * `Err(String)` - Error message if loading failed
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {}", e))
    }

    /// Load configuration from `windowpane.toml` in the current directory,
    /// or return default configuration if the file doesn't exist
    pub fn load_or_default() -> Self {
        Self::load_from_file("windowpane.toml").unwrap_or_default()
    }

    /// Merge configuration with environment variables
    ///
    /// Environment variables take precedence over configuration file values.
    pub fn merge_with_env(&mut self) {
        if let Ok(val) = std::env::var("WINDOWPANE_TARGET_WIDTH") {
            if let Ok(width) = val.parse::<u32>() {
                self.compositor.target_width = width;
            }
        }
        if let Ok(val) = std::env::var("WINDOWPANE_TARGET_HEIGHT") {
            if let Ok(height) = val.parse::<u32>() {
                self.compositor.target_height = height;
            }
        }
        if let Ok(tag) = std::env::var("WINDOWPANE_EXCLUSIVE_TAG") {
            self.compositor.exclusive_tag = tag;
        }
        if let Ok(filter) = std::env::var("WINDOWPANE_LOG") {
            self.logging.filter = filter;
        }
    }

    /// Load configuration with environment variable overrides
    ///
    /// 1. Load from windowpane.toml (or use defaults if not found)
    /// 2. Override with environment variables if present
    pub fn load() -> Self {
        let mut config = Self::load_or_default();
        config.merge_with_env();
        config
    }
}
