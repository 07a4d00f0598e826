// src/storage/memory.rs
use async_trait::async_trait;
use std::sync::Mutex;

use super::DocumentStore;
use crate::models::ExtractionResult;
use crate::utils::error::StorageError;

/// In-process store. Keeps every saved record, duplicates included, so callers
/// can observe how many times a link was persisted.
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<Vec<ExtractionResult>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of saved records for `link`.
    pub fn count_for(&self, link: &str) -> usize {
        self.lock().iter().filter(|r| r.link == link).count()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn records(&self) -> Vec<ExtractionResult> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<ExtractionResult>> {
        // A poisoned lock only means another holder panicked; the data is still usable.
        self.records.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find_by_link(&self, link: &str) -> Result<Option<ExtractionResult>, StorageError> {
        Ok(self.lock().iter().find(|r| r.link == link).cloned())
    }

    async fn save(&self, record: &ExtractionResult) -> Result<(), StorageError> {
        self.lock().push(record.clone());
        Ok(())
    }
}
