//! The persisted slot: one named location holding the current Application
//! Record as serialized JSON text.
//!
//! Both components talk to the slot only through [`RecordStore`], so the
//! backend (in-memory for tests, a JSON file for the running service) is
//! chosen at startup without touching intake or presentation code.
//!
//! Writes replace the whole record. Reads never fail on bad content: text that
//! does not parse as a record is logged and reported as "no record".

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{Config, StoreBackend};
use crate::models::ApplicationRecord;

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Storage task failed: {0}")]
    Task(String),
}

/// Single-record repository with one logical key.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Returns the current record, or `None` when the slot is empty or unreadable.
    async fn get(&self) -> Result<Option<ApplicationRecord>, StoreError>;

    /// Overwrites the slot with `record`. Last write wins.
    async fn put(&self, record: &ApplicationRecord) -> Result<(), StoreError>;

    /// Short backend name for logs.
    fn backend(&self) -> &'static str;
}

/// Builds the store selected by `STORE_BACKEND`.
pub fn build_store(config: &Config) -> Arc<dyn RecordStore> {
    match config.store_backend {
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
        StoreBackend::File => {
            let store = FileStore::new(config.record_path.clone());
            info!("Record file: {}", store.path().display());
            Arc::new(store)
        }
    }
}

pub(crate) fn encode_slot(record: &ApplicationRecord) -> Result<String, StoreError> {
    Ok(serde_json::to_string(record)?)
}

/// Only a JSON object is a record. Derived struct deserialization would also
/// accept an array and fill fields by position.
pub(crate) fn decode_slot(raw: &str) -> Option<ApplicationRecord> {
    let value = match serde_json::from_str::<Value>(raw) {
        Ok(value @ Value::Object(_)) => value,
        Ok(other) => {
            warn!("Stored record is not a JSON object, treating slot as empty: {other}");
            return None;
        }
        Err(e) => {
            warn!("Stored record is not valid JSON, treating slot as empty: {e}");
            return None;
        }
    };
    match serde_json::from_value::<ApplicationRecord>(value) {
        Ok(record) => Some(record),
        Err(e) => {
            warn!("Stored record does not match the record shape, treating slot as empty: {e}");
            None
        }
    }
}
