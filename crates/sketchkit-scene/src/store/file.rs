//! Document store backed by one JSON file per canvas.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use sketchkit_core::{CanvasId, StoreError};

use super::{DocumentStore, StoredRecord};

/// Stores `<dir>/<canvas id>.json`
#[derive(Debug, Clone)]
pub struct FileDocumentStore {
    dir: PathBuf,
}

impl FileDocumentStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub(crate) fn record_path(dir: &Path, canvas_id: &CanvasId, suffix: &str) -> Result<PathBuf, StoreError> {
        if !canvas_id.is_path_safe() {
            return Err(StoreError::Backend {
                message: format!("canvas id '{}' is not a valid file name", canvas_id),
            });
        }
        Ok(dir.join(format!("{}{}", canvas_id, suffix)))
    }
}

/// Write through a temporary file and rename, so readers never see half a file
pub(crate) async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, bytes).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

#[async_trait]
impl DocumentStore for FileDocumentStore {
    async fn get(&self, canvas_id: &CanvasId) -> Result<Option<StoredRecord>, StoreError> {
        let path = Self::record_path(&self.dir, canvas_id, ".json")?;
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let record = serde_json::from_slice(&bytes)?;
        tracing::debug!("Read {}", path.display());
        Ok(Some(record))
    }

    async fn put(&self, canvas_id: &CanvasId, record: StoredRecord) -> Result<(), StoreError> {
        let path = Self::record_path(&self.dir, canvas_id, ".json")?;
        let bytes = serde_json::to_vec_pretty(&record)?;
        write_atomic(&path, &bytes).await?;
        tracing::debug!("Wrote {} ({} shapes)", path.display(), record.shape_count);
        Ok(())
    }

    async fn create(&self) -> Result<CanvasId, StoreError> {
        let canvas_id = CanvasId::generate();
        self.put(&canvas_id, StoredRecord::empty()).await?;
        Ok(canvas_id)
    }
}
