//! Wiring between the configuration file and the scene crate.
//!
//! A [`Workspace`] owns the file-backed document store and auto-save cache
//! named by the config, and opens sessions over in-memory scenes.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use sketchkit_core::{thread_safe, CanvasId};
use sketchkit_scene::{
    BrushWidths, CanvasProperties, Color, EncodeOptions, FileDocumentStore, FileSceneCache,
    LoadOutcome, MemoryScene, SceneCache, SceneSession, SceneStore, SessionOptions,
    ToolController,
};
use sketchkit_settings::Config;

/// Canvas defaults from the `[canvas]` section
pub fn canvas_properties(config: &Config) -> anyhow::Result<CanvasProperties> {
    let background = Color::parse(&config.canvas.background_color)
        .context("Invalid canvas.background_color")?;
    Ok(CanvasProperties::new(
        config.canvas.width,
        config.canvas.height,
        background,
    ))
}

/// Session behavior from the `[persistence]` section
pub fn session_options(config: &Config) -> SessionOptions {
    SessionOptions {
        autosave: config.persistence.autosave_enabled,
        autosave_debounce: Duration::from_millis(config.persistence.autosave_debounce_ms),
        encode: EncodeOptions {
            decimation_threshold: config.persistence.decimation_threshold,
        },
    }
}

/// Tool controller seeded from the `[brush]` section
pub fn tool_controller(config: &Config) -> anyhow::Result<ToolController> {
    let color =
        Color::parse(&config.brush.default_color).context("Invalid brush.default_color")?;
    Ok(ToolController::new(
        color,
        BrushWidths {
            pen: config.brush.pen_width,
            eraser: config.brush.eraser_width,
        },
    ))
}

/// Stores and defaults shared by every command
pub struct Workspace {
    config: Config,
    store: Arc<SceneStore>,
    cache: Arc<dyn SceneCache>,
}

impl Workspace {
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        config.validate().context("Invalid configuration")?;
        // Fail early on bad colors rather than on first use
        canvas_properties(&config)?;
        tool_controller(&config)?;

        let backend = FileDocumentStore::new(&config.persistence.store_dir);
        let cache = FileSceneCache::new(&config.persistence.cache_dir);
        tracing::debug!(
            "Workspace store {} cache {}",
            config.persistence.store_dir.display(),
            config.persistence.cache_dir.display()
        );

        Ok(Self {
            store: Arc::new(SceneStore::new(Arc::new(backend))),
            cache: Arc::new(cache),
            config,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &Arc<SceneStore> {
        &self.store
    }

    /// Create an empty drawing and return its id
    pub async fn create_canvas(&self) -> anyhow::Result<CanvasId> {
        self.store
            .create_canvas()
            .await
            .context("Failed to create canvas")
    }

    /// Open and load a drawing.
    ///
    /// A failed load is an error here; the interactive surface keeps going
    /// with an empty scene, but a command must not overwrite what it could
    /// not read.
    pub async fn open(
        &self,
        canvas_id: CanvasId,
    ) -> anyhow::Result<(SceneSession<MemoryScene>, LoadOutcome)> {
        let scene = MemoryScene::new(canvas_properties(&self.config)?);
        let mut session = SceneSession::new(
            canvas_id,
            thread_safe(scene),
            Arc::clone(&self.store),
            Arc::clone(&self.cache),
            session_options(&self.config),
        );

        let outcome = session.load().await;
        if let LoadOutcome::Failed { reason } = &outcome {
            anyhow::bail!("Canvas {} could not be read: {}", session.canvas_id(), reason);
        }
        Ok((session, outcome))
    }

    pub fn tool_controller(&self) -> anyhow::Result<ToolController> {
        tool_controller(&self.config)
    }
}
