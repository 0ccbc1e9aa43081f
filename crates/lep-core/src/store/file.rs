//! JSON file store backend
//!
//! The whole keyspace is one JSON object on disk. Writes go to a sibling
//! temporary file and are renamed into place.

use super::KeyValueStore;
use crate::error::StorageError;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// File-backed key-value store
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles on the file
    lock: Mutex<()>,
}

impl JsonFileStore {
    /// Open store at path; the file is created on first write
    #[inline]
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Store file location
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the full keyspace
    ///
    /// # Errors
    /// IO failures other than a missing file, or a file that is not a JSON object.
    pub async fn snapshot(&self) -> Result<Map<String, Value>, StorageError> {
        let _guard = self.lock.lock().await;
        self.read_all().await
    }

    async fn read_all(&self) -> Result<Map<String, Value>, StorageError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(source) => {
                return Err(StorageError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Map::new());
        }
        let key = self.path.display().to_string();
        match serde_json::from_slice::<Value>(&bytes)
            .map_err(|e| StorageError::serialization(key.clone(), e))?
        {
            Value::Object(map) => Ok(map),
            _ => Err(StorageError::backend(key, "store file is not a JSON object")),
        }
    }

    async fn write_all(&self, map: &Map<String, Value>) -> Result<(), StorageError> {
        let bytes = serde_json::to_vec_pretty(map)
            .map_err(|e| StorageError::serialization(self.path.display().to_string(), e))?;
        let tmp = self.path.with_extension("json.tmp");
        let io_err = |source| StorageError::Io {
            path: self.path.clone(),
            source,
        };
        tokio::fs::write(&tmp, bytes).await.map_err(io_err)?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(io_err)
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        let _guard = self.lock.lock().await;
        Ok(self.read_all().await?.remove(key))
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StorageError> {
        let _guard = self.lock.lock().await;
        let mut map = self.read_all().await?;
        map.insert(key.to_string(), value);
        self.write_all(&map).await
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock().await;
        let mut map = self.read_all().await?;
        if map.remove(key).is_some() {
            self.write_all(&map).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("store.json"));
        assert!(store.get("anything").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        let store = JsonFileStore::new(&path);
        store.set("pluginDrafts:medlab", json!({"reportData": {}})).await.unwrap();
        store.set("reportLogs", json!([])).await.unwrap();
        store.delete("reportLogs").await.unwrap();

        let reopened = JsonFileStore::new(&path);
        let snapshot = reopened.snapshot().await.unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(
            reopened.get("pluginDrafts:medlab").await.unwrap(),
            Some(json!({"reportData": {}}))
        );
    }

    #[tokio::test]
    async fn non_object_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "[1, 2]").unwrap();

        let store = JsonFileStore::new(&path);
        assert!(matches!(
            store.get("k").await,
            Err(StorageError::Backend { .. })
        ));
    }

    #[tokio::test]
    async fn corrupt_file_is_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = JsonFileStore::new(&path);
        assert!(matches!(
            store.set("k", json!(1)).await,
            Err(StorageError::Serialization { .. })
        ));
    }
}
