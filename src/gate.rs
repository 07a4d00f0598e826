// src/gate.rs
use crate::storage::DocumentStore;
use crate::utils::error::StorageError;

/// Pre-extraction existence check.
///
/// Check-then-save is not atomic: two concurrent extractions of the same link
/// can both pass and both persist. Sequential callers always see one record.
pub struct IdempotenceGate<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> IdempotenceGate<'a> {
    pub fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// True when a record for `link` is already stored. Logs the skip.
    pub async fn already_processed(&self, link: &str, platform: &str) -> Result<bool, StorageError> {
        match self.store.find_by_link(link).await? {
            Some(existing) => {
                tracing::info!(
                    link = %link,
                    platform = %platform,
                    stored_at = %existing.created_at.to_rfc3339(),
                    "Link already exists in the database, skipping"
                );
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
