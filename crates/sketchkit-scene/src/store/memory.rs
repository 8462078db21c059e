use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use sketchkit_core::{CanvasId, StoreError};

use super::{DocumentStore, StoredRecord};

/// Document store held in process memory
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    records: RwLock<HashMap<CanvasId, StoredRecord>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed or overwrite a record directly
    pub fn insert(&self, canvas_id: CanvasId, record: StoredRecord) {
        self.records.write().insert(canvas_id, record);
    }

    pub fn record(&self, canvas_id: &CanvasId) -> Option<StoredRecord> {
        self.records.read().get(canvas_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, canvas_id: &CanvasId) -> Result<Option<StoredRecord>, StoreError> {
        Ok(self.record(canvas_id))
    }

    async fn put(&self, canvas_id: &CanvasId, record: StoredRecord) -> Result<(), StoreError> {
        self.insert(canvas_id.clone(), record);
        Ok(())
    }

    async fn create(&self) -> Result<CanvasId, StoreError> {
        let canvas_id = CanvasId::generate();
        self.insert(canvas_id.clone(), StoredRecord::empty());
        Ok(canvas_id)
    }
}
