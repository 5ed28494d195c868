//! Storage collaborator boundary.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::StorageError;
use crate::models::record::InvoiceRecord;

/// Persistent store for invoice records.
///
/// The pipeline owns record creation, not persistence: it hands one
/// immutable record to `put` and never edits it afterwards. Reads are
/// assumed strongly consistent per user (read-after-write). Retry policy
/// lives behind this boundary, not in the pipeline.
#[async_trait]
pub trait InvoiceStore: Send + Sync {
    /// Persist one record, returning its id.
    async fn put(&self, record: InvoiceRecord) -> Result<String, StorageError>;

    /// All records owned by the given user.
    async fn list_by_user(&self, user_id: &str) -> Result<Vec<InvoiceRecord>, StorageError>;
}

/// In-memory store, keyed by record id.
///
/// Used by tests and as the default for embedded use.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, InvoiceRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total record count across users.
    pub fn len(&self) -> usize {
        self.records.read().expect("store lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl InvoiceStore for MemoryStore {
    async fn put(&self, record: InvoiceRecord) -> Result<String, StorageError> {
        let id = record.id.clone();
        self.records
            .write()
            .expect("store lock poisoned")
            .insert(id.clone(), record);
        Ok(id)
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<InvoiceRecord>, StorageError> {
        let mut records: Vec<InvoiceRecord> = self
            .records
            .read()
            .expect("store lock poisoned")
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();

        // Stable order for deterministic downstream answers.
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(records)
    }
}
