//! In-memory store backend

use super::KeyValueStore;
use crate::error::StorageError;
use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;

/// Process-local key-value store
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, Value>,
}

impl MemoryStore {
    /// Create empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create store pre-populated with entries
    #[must_use]
    pub fn with_entries<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        let store = Self::new();
        for (key, value) in entries {
            store.entries.insert(key.into(), value);
        }
        store
    }

    /// Synchronous peek, for inspection outside the pipeline
    #[inline]
    #[must_use]
    pub fn peek(&self, key: &str) -> Option<Value> {
        self.entries.get(key).map(|e| e.value().clone())
    }

    /// Whether a key is present
    #[inline]
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of stored keys
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if store is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        Ok(self.peek(key))
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}
