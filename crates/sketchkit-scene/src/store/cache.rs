//! Local auto-save caches.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use parking_lot::RwLock;
use sketchkit_core::{CanvasId, StoreError};

use super::file::{write_atomic, FileDocumentStore};
use super::SceneCache;
use crate::document::SceneDocument;

/// Cache kept in memory; readable for inspection
#[derive(Debug, Default)]
pub struct MemorySceneCache {
    entries: RwLock<HashMap<CanvasId, SceneDocument>>,
}

impl MemorySceneCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &CanvasId) -> Option<SceneDocument> {
        self.entries.read().get(key).cloned()
    }
}

#[async_trait]
impl SceneCache for MemorySceneCache {
    async fn write(&self, key: &CanvasId, document: &SceneDocument) -> Result<(), StoreError> {
        self.entries.write().insert(key.clone(), document.clone());
        Ok(())
    }
}

/// Cache written to `<dir>/<canvas id>.autosave.json`
#[derive(Debug, Clone)]
pub struct FileSceneCache {
    dir: PathBuf,
}

impl FileSceneCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, key: &CanvasId) -> Result<PathBuf, StoreError> {
        FileDocumentStore::record_path(&self.dir, key, ".autosave.json")
    }
}

#[async_trait]
impl SceneCache for FileSceneCache {
    async fn write(&self, key: &CanvasId, document: &SceneDocument) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        let bytes = document.to_bytes()?;
        write_atomic(&path, &bytes).await?;
        tracing::trace!("Auto-saved {}", path.display());
        Ok(())
    }
}
