//! SketchKit Settings Crate
//!
//! Handles application configuration: canvas defaults, persistence
//! locations and auto-save timing, and brush widths.

pub mod config;
pub mod error;

pub use config::{BrushSettings, CanvasSettings, Config, PersistenceSettings};
pub use error::{ConfigError, SettingsError, SettingsResult};
