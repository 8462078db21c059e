//! Configuration for SketchKit
//!
//! Provides configuration file handling and validation. Supports JSON and
//! TOML file formats stored in platform-specific directories.
//!
//! Configuration is organized into logical sections:
//! - Canvas defaults (size, background)
//! - Persistence (store and cache locations, auto-save timing, decimation)
//! - Brush widths and the initial drawing color

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, SettingsError, SettingsResult};

const APP_DIR: &str = "sketchkit";

fn data_root() -> PathBuf {
    dirs::data_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

/// Canvas defaults for new drawings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasSettings {
    /// Canvas width in pixels
    pub width: u32,
    /// Canvas height in pixels
    pub height: u32,
    /// Background color, any CSS-style notation
    pub background_color: String,
}

impl Default for CanvasSettings {
    fn default() -> Self {
        Self {
            width: 800,
            height: 500,
            background_color: "#ffffff".to_string(),
        }
    }
}

/// Where and how drawings are persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenceSettings {
    /// Directory of the file-backed document store
    pub store_dir: PathBuf,
    /// Directory of the local auto-save cache
    pub cache_dir: PathBuf,
    pub autosave_enabled: bool,
    /// Quiet period before an auto-save, in milliseconds
    pub autosave_debounce_ms: u64,
    /// Free-hand paths with more commands than this are thinned on save
    pub decimation_threshold: usize,
}

impl Default for PersistenceSettings {
    fn default() -> Self {
        let root = data_root();
        Self {
            store_dir: root.join("canvases"),
            cache_dir: dirs::cache_dir()
                .map(|dir| dir.join(APP_DIR))
                .unwrap_or_else(|| root.join("cache")),
            autosave_enabled: true,
            autosave_debounce_ms: 300,
            decimation_threshold: 100,
        }
    }
}

/// Free-hand brush settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrushSettings {
    pub pen_width: f64,
    pub eraser_width: f64,
    /// Initial drawing color
    pub default_color: String,
}

impl Default for BrushSettings {
    fn default() -> Self {
        Self {
            pen_width: 5.0,
            eraser_width: 20.0,
            default_color: "#ff0000".to_string(),
        }
    }
}

/// Complete application configuration
///
/// Aggregates all settings sections and provides file I/O operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub canvas: CanvasSettings,
    #[serde(default)]
    pub persistence: PersistenceSettings,
    #[serde(default)]
    pub brush: BrushSettings,
}

fn format_of(path: &Path) -> SettingsResult<&'static str> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok("json"),
        Some("toml") => Ok("toml"),
        other => Err(ConfigError::UnsupportedFormat(other.unwrap_or("none").to_string()).into()),
    }
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Platform default location of the config file
    pub fn default_path() -> SettingsResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR).join("config.toml"))
            .ok_or_else(|| {
                SettingsError::ConfigDirectory("no config directory on this platform".to_string())
            })
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = format_of(path)?;
        let content = std::fs::read_to_string(path)
            .map_err(|e| SettingsError::LoadError(format!("{}: {}", path.display(), e)))?;

        let config: Self = if format == "json" {
            serde_json::from_str(&content)?
        } else {
            toml::from_str(&content)?
        };

        config.validate()?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load from `path` if given, else from the default location if it
    /// exists, else defaults
    pub fn load_or_default(path: Option<&Path>) -> SettingsResult<Self> {
        if let Some(path) = path {
            return Self::load_from_file(path);
        }
        match Self::default_path() {
            Ok(path) if path.exists() => Self::load_from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = if format_of(path)? == "json" {
            serde_json::to_string_pretty(self)?
        } else {
            toml::to_string_pretty(self)?
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| SettingsError::ConfigDirectory(e.to_string()))?;
        }
        std::fs::write(path, content)
            .map_err(|e| SettingsError::SaveError(format!("{}: {}", path.display(), e)))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(ConfigError::ValueOutOfRange {
                key: "canvas.width/height".to_string(),
                value: format!("{}x{}", self.canvas.width, self.canvas.height),
            }
            .into());
        }

        for (key, width) in [
            ("brush.pen_width", self.brush.pen_width),
            ("brush.eraser_width", self.brush.eraser_width),
        ] {
            // NaN fails every comparison, so test for the valid range
            if !(width.is_finite() && width > 0.0) {
                return Err(ConfigError::ValueOutOfRange {
                    key: key.to_string(),
                    value: width.to_string(),
                }
                .into());
            }
        }

        for (key, value) in [
            ("canvas.background_color", &self.canvas.background_color),
            ("brush.default_color", &self.brush.default_color),
        ] {
            if value.trim().is_empty() {
                return Err(SettingsError::InvalidSetting {
                    key: key.to_string(),
                    reason: "must not be empty".to_string(),
                });
            }
        }

        if self.persistence.decimation_threshold == 0 {
            return Err(ConfigError::ValueOutOfRange {
                key: "persistence.decimation_threshold".to_string(),
                value: "0".to_string(),
            }
            .into());
        }

        Ok(())
    }
}
