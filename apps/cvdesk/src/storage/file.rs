//! # JSON-file-backed slot
//!
//! [`FileStore`] keeps the record in a single UTF-8 JSON file so it survives
//! restarts. Writes go to a temporary file in the same directory which is then
//! renamed over the target, so a reader sees either the old record or the new
//! one, never a torn write.

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tracing::warn;

use super::{decode_slot, encode_slot, RecordStore, StoreError};
use crate::models::ApplicationRecord;

#[derive(Clone, Debug)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parent_dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}

#[async_trait]
impl RecordStore for FileStore {
    async fn get(&self) -> Result<Option<ApplicationRecord>, StoreError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => Ok(decode_slot(&raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                warn!(
                    "Record file {} is not UTF-8, treating slot as empty",
                    self.path.display()
                );
                Ok(None)
            }
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    async fn put(&self, record: &ApplicationRecord) -> Result<(), StoreError> {
        let raw = encode_slot(record)?;
        let dir = self.parent_dir();
        let target = self.path.clone();

        tokio::task::spawn_blocking(move || -> Result<(), StoreError> {
            std::fs::create_dir_all(&dir)?;
            let mut tmp = NamedTempFile::new_in(&dir)?;
            tmp.write_all(raw.as_bytes())?;
            tmp.as_file().sync_all()?;
            tmp.persist(&target).map_err(|e| StoreError::Io(e.error))?;
            Ok(())
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
    }

    fn backend(&self) -> &'static str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn record(name: &str) -> ApplicationRecord {
        ApplicationRecord {
            name: Some(name.to_string()),
            skills: Some(vec!["Driving".to_string()]),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_missing_file_is_empty_slot() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().join("cv_record.json"));
        assert!(store.get().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_creates_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("data").join("cv_record.json");
        let store = FileStore::new(path.clone());

        store.put(&record("Amina")).await.unwrap();

        assert!(path.exists());
        assert_eq!(store.get().await.unwrap(), Some(record("Amina")));
    }

    #[tokio::test]
    async fn test_record_survives_a_new_store_instance() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cv_record.json");

        FileStore::new(path.clone()).put(&record("Amina")).await.unwrap();
        let reopened = FileStore::new(path);

        assert_eq!(reopened.get().await.unwrap(), Some(record("Amina")));
    }

    #[tokio::test]
    async fn test_overwrite_leaves_only_latest() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().join("cv_record.json"));

        store.put(&record("A")).await.unwrap();
        store.put(&record("B")).await.unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(!raw.contains("\"A\""));
        assert_eq!(store.get().await.unwrap(), Some(record("B")));

        // No stray temp files left next to the record.
        let entries = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[tokio::test]
    async fn test_corrupt_file_reads_as_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cv_record.json");
        std::fs::write(&path, "{\"name\": \"Amina\"").unwrap();
        assert!(FileStore::new(path.clone()).get().await.unwrap().is_none());

        std::fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();
        assert!(FileStore::new(path).get().await.unwrap().is_none());
    }
}
