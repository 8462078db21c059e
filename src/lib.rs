//! # SketchKit
//!
//! A 2D drawing surface whose scenes persist as versioned shape documents.
//!
//! ## Architecture
//!
//! SketchKit is organized as a workspace with multiple crates:
//!
//! 1. **sketchkit-core** - Error taxonomy, identifiers, scene event bus
//! 2. **sketchkit-scene** - Shape descriptors, codec, resolver, stores, sessions, tools
//! 3. **sketchkit-settings** - Configuration file handling
//! 4. **sketchkit** - Command-line binary that wires the crates together

pub mod workspace;

pub use sketchkit_core::{CanvasId, Error, InstanceHandle, Result};
pub use sketchkit_scene::{
    LoadOutcome, MemoryScene, SceneDocument, SceneSession, SessionOptions, Tool, ToolController,
};
pub use sketchkit_settings::Config;
pub use workspace::Workspace;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Pretty console output on stderr, so command output stays clean
/// - RUST_LOG environment variable support
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_line_number(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
