use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{decode_slot, encode_slot, RecordStore, StoreError};
use crate::models::ApplicationRecord;

/// In-memory slot for tests and throwaway sessions. Lost on restart.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    slot: Arc<RwLock<Option<String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the slot with raw text, bypassing serialization.
    #[cfg(test)]
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            slot: Arc::new(RwLock::new(Some(raw.into()))),
        }
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn get(&self) -> Result<Option<ApplicationRecord>, StoreError> {
        let slot = self.slot.read().await;
        Ok(slot.as_deref().and_then(decode_slot))
    }

    async fn put(&self, record: &ApplicationRecord) -> Result<(), StoreError> {
        let raw = encode_slot(record)?;
        *self.slot.write().await = Some(raw);
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str) -> ApplicationRecord {
        ApplicationRecord {
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_empty_store_has_no_record() {
        let store = MemoryStore::new();
        assert!(store.get().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_last_write_wins() {
        let store = MemoryStore::new();
        store.put(&record("A")).await.unwrap();
        store.put(&record("B")).await.unwrap();

        let current = store.get().await.unwrap().unwrap();
        assert_eq!(current.name.as_deref(), Some("B"));
    }

    #[tokio::test]
    async fn test_clones_share_the_slot() {
        let store = MemoryStore::new();
        let reader = store.clone();
        store.put(&record("Amina")).await.unwrap();
        assert_eq!(reader.get().await.unwrap(), Some(record("Amina")));
    }

    #[tokio::test]
    async fn test_corrupt_slot_reads_as_empty() {
        let store = MemoryStore::with_raw("{\"name\": ");
        assert!(store.get().await.unwrap().is_none());

        // A fresh submit repairs the slot.
        store.put(&record("Fixed")).await.unwrap();
        assert!(store.get().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_array_slot_reads_as_empty() {
        let store = MemoryStore::with_raw("[\"x\"]");
        assert!(store.get().await.unwrap().is_none());
    }
}
