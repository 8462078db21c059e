//! Persistence backends and the adapter the session talks to.
//!
//! The remote document store keeps one [`StoredRecord`] per canvas. The local
//! auto-save cache is write-only from this crate's point of view.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use sketchkit_core::{CanvasId, StoreError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::document::SceneDocument;
use crate::resolver::{self, Resolution};

mod cache;
mod file;
mod memory;

pub use cache::{FileSceneCache, MemorySceneCache};
pub use file::FileDocumentStore;
pub use memory::MemoryDocumentStore;

/// One record in the document store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredRecord {
    /// Serialized document, legacy engine dump, or null
    #[serde(default)]
    pub data: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
    #[serde(default)]
    pub shape_count: u64,
}

impl StoredRecord {
    /// Record for a freshly created canvas
    pub fn empty() -> Self {
        Self {
            data: serde_json::Value::Null,
            last_modified: Some(Utc::now()),
            shape_count: 0,
        }
    }

    pub fn from_document(
        document: &SceneDocument,
        last_modified: DateTime<Utc>,
    ) -> Result<Self, StoreError> {
        Ok(Self {
            data: document.to_value()?,
            last_modified: Some(last_modified),
            shape_count: document.shape_count() as u64,
        })
    }
}

/// Remote document store
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch the record for a canvas; `None` if it does not exist
    async fn get(&self, canvas_id: &CanvasId) -> Result<Option<StoredRecord>, StoreError>;

    /// Replace the record for a canvas
    async fn put(&self, canvas_id: &CanvasId, record: StoredRecord) -> Result<(), StoreError>;

    /// Allocate a new canvas holding an empty record
    async fn create(&self) -> Result<CanvasId, StoreError>;
}

/// Local auto-save cache
#[async_trait]
pub trait SceneCache: Send + Sync {
    async fn write(&self, key: &CanvasId, document: &SceneDocument) -> Result<(), StoreError>;
}

/// Acknowledgement of a committed save
#[derive(Debug, Clone, PartialEq)]
pub struct SaveReceipt {
    pub canvas_id: CanvasId,
    pub last_modified: DateTime<Utc>,
    pub shape_count: u64,
}

/// Adapter between sessions and a [`DocumentStore`].
///
/// Resolves fetched payloads and serializes commits per canvas: a commit
/// holds the canvas lock from snapshot to acknowledgement, so two saves of
/// one canvas never interleave.
pub struct SceneStore {
    backend: Arc<dyn DocumentStore>,
    commit_locks: Mutex<HashMap<CanvasId, Arc<AsyncMutex<()>>>>,
}

impl SceneStore {
    pub fn new(backend: Arc<dyn DocumentStore>) -> Self {
        Self {
            backend,
            commit_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn backend(&self) -> &Arc<dyn DocumentStore> {
        &self.backend
    }

    pub async fn create_canvas(&self) -> Result<CanvasId, StoreError> {
        let canvas_id = self.backend.create().await?;
        tracing::info!("Created canvas {}", canvas_id);
        Ok(canvas_id)
    }

    /// Fetch and classify the stored payload of a canvas
    pub async fn fetch(&self, canvas_id: &CanvasId) -> Result<Resolution, StoreError> {
        let Some(record) = self.backend.get(canvas_id).await? else {
            tracing::info!("No stored record for canvas {}", canvas_id);
            return Ok(Resolution::Empty);
        };

        let resolution = resolver::resolve(Some(&record.data));
        if let Resolution::Versioned(decoded) = &resolution {
            let stored = decoded.document.shape_count() + decoded.anomalies.len();
            if stored as u64 != record.shape_count {
                tracing::warn!(
                    "Canvas {} records shapeCount {} but holds {} shapes",
                    canvas_id,
                    record.shape_count,
                    stored
                );
            }
        }
        Ok(resolution)
    }

    /// Take the commit lock of a canvas
    pub async fn lock_canvas(&self, canvas_id: &CanvasId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.commit_locks.lock();
            // Guards and waiters hold a clone; a lone entry is idle
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            Arc::clone(locks.entry(canvas_id.clone()).or_default())
        };
        lock.lock_owned().await
    }

    #[cfg(test)]
    fn lock_count(&self) -> usize {
        self.commit_locks.lock().len()
    }

    /// Write a document as the canvas's record.
    ///
    /// Callers that snapshot first should hold [`SceneStore::lock_canvas`]
    /// across snapshot and commit.
    pub async fn commit(
        &self,
        canvas_id: &CanvasId,
        document: &SceneDocument,
    ) -> Result<SaveReceipt, StoreError> {
        let now = Utc::now();
        let record = StoredRecord::from_document(document, now)?;
        let shape_count = record.shape_count;
        self.backend.put(canvas_id, record).await?;

        Ok(SaveReceipt {
            canvas_id: canvas_id.clone(),
            last_modified: now,
            shape_count,
        })
    }

    /// Lock, commit and release
    pub async fn save_document(
        &self,
        canvas_id: &CanvasId,
        document: &SceneDocument,
    ) -> Result<SaveReceipt, StoreError> {
        let _guard = self.lock_canvas(canvas_id).await;
        self.commit(canvas_id, document).await
    }
}
