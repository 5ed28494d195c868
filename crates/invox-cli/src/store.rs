//! JSON-file store for the local CLI workflow.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use invox_core::{InvoiceRecord, InvoiceStore, StorageError};

/// One JSON file per install, holding every record. Loaded once on open
/// and rewritten atomically after each put.
pub struct JsonFileStore {
    path: PathBuf,
    records: RwLock<Vec<InvoiceRecord>>,
}

impl JsonFileStore {
    /// Open or create the store under the given data directory.
    pub fn open(data_dir: &Path) -> anyhow::Result<Self> {
        fs::create_dir_all(data_dir)?;
        let path = data_dir.join("invoices.json");

        let records = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            serde_json::from_str(&raw)?
        } else {
            Vec::new()
        };

        Ok(Self {
            path,
            records: RwLock::new(records),
        })
    }

    /// Default data directory, under the platform config dir.
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("invox")
    }

    fn persist(&self, records: &[InvoiceRecord]) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(records)
            .map_err(|e| StorageError::Put(e.to_string()))?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(StorageError::Io)?;
        fs::rename(&tmp, &self.path).map_err(StorageError::Io)?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl InvoiceStore for JsonFileStore {
    async fn put(&self, record: InvoiceRecord) -> Result<String, StorageError> {
        let id = record.id.clone();
        let snapshot = {
            let mut records = self
                .records
                .write()
                .map_err(|_| StorageError::Put("store lock poisoned".to_string()))?;
            records.push(record);
            records.clone()
        };
        self.persist(&snapshot)?;
        Ok(id)
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<InvoiceRecord>, StorageError> {
        let records = self
            .records
            .read()
            .map_err(|_| StorageError::List {
                user_id: user_id.to_string(),
                reason: "store lock poisoned".to_string(),
            })?;
        let mut matching: Vec<InvoiceRecord> = records
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(matching)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use invox_core::{DocType, ParsedFields};
    use rust_decimal::Decimal;

    fn record(user: &str, id: &str) -> InvoiceRecord {
        InvoiceRecord {
            id: id.to_string(),
            user_id: user.to_string(),
            filename: "a.txt".to_string(),
            ocr_text: vec![],
            fields: ParsedFields::default(),
            doc_type: DocType::Unknown,
            language: "unknown".to_string(),
            vat: Decimal::ZERO,
            tax_valid: false,
            fraud_score: 0.0,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_records_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();

        let store = JsonFileStore::open(dir.path()).unwrap();
        store.put(record("u1", "r1")).await.unwrap();
        store.put(record("u2", "r2")).await.unwrap();
        drop(store);

        let reopened = JsonFileStore::open(dir.path()).unwrap();
        let records = reopened.list_by_user("u1").await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "r1");
    }
}
