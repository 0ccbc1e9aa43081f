//! Key-value draft store
//!
//! The pipeline's only shared mutable state lives behind [`KeyValueStore`]:
//! - `pluginDrafts:<id>`: one draft per plugin
//! - `pluginResults:<id>`: latest report result per plugin
//! - `reportLogs`: the audit log sequence
//!
//! Every operation returns `Result<_, StorageError>`; absence is `Ok(None)`.
//! [`DraftStore`] layers the typed, keyed accessors the orchestrators use.

mod file;
mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

use crate::error::StorageError;
use crate::types::{Draft, ReportResult};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Key of the audit log sequence
pub const REPORT_LOGS_KEY: &str = "reportLogs";

/// Key of a plugin's draft
#[inline]
#[must_use]
pub fn draft_key(plugin_id: &str) -> String {
    format!("pluginDrafts:{plugin_id}")
}

/// Key of a plugin's latest report result
#[inline]
#[must_use]
pub fn result_key(plugin_id: &str) -> String {
    format!("pluginResults:{plugin_id}")
}

/// Asynchronous key-value storage
///
/// Implementations must report access failures as `Err`, never as `Ok(None)`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError>;

    /// Write a value, replacing any previous one
    async fn set(&self, key: &str, value: Value) -> Result<(), StorageError>;

    /// Remove a value; removing an absent key succeeds
    async fn delete(&self, key: &str) -> Result<(), StorageError>;
}

/// Typed access to drafts and results over a shared store
#[derive(Clone)]
pub struct DraftStore {
    inner: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for DraftStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DraftStore").finish_non_exhaustive()
    }
}

impl DraftStore {
    /// Wrap a store backend
    #[inline]
    #[must_use]
    pub fn new(inner: Arc<dyn KeyValueStore>) -> Self {
        Self { inner }
    }

    /// Underlying backend
    #[inline]
    #[must_use]
    pub fn backend(&self) -> &Arc<dyn KeyValueStore> {
        &self.inner
    }

    /// Raw stored draft; `null` counts as absent
    ///
    /// # Errors
    /// Propagates backend failures.
    pub async fn load_draft_value(&self, plugin_id: &str) -> Result<Option<Value>, StorageError> {
        let value = self.inner.get(&draft_key(plugin_id)).await?;
        Ok(value.filter(|v| !v.is_null()))
    }

    /// Decoded draft
    ///
    /// # Errors
    /// Backend failures, or `StorageError::Serialization` for a malformed draft.
    pub async fn load_draft(&self, plugin_id: &str) -> Result<Option<Draft>, StorageError> {
        let key = draft_key(plugin_id);
        match self.load_draft_value(plugin_id).await? {
            Some(value) => Draft::from_value(value)
                .map(Some)
                .map_err(|e| StorageError::serialization(key, e)),
            None => Ok(None),
        }
    }

    /// Whether a draft exists
    ///
    /// # Errors
    /// Propagates backend failures.
    pub async fn has_draft(&self, plugin_id: &str) -> Result<bool, StorageError> {
        Ok(self.load_draft_value(plugin_id).await?.is_some())
    }

    /// Persist a draft
    ///
    /// # Errors
    /// Propagates backend and encoding failures.
    pub async fn save_draft(&self, plugin_id: &str, draft: &Draft) -> Result<(), StorageError> {
        let key = draft_key(plugin_id);
        let value = draft
            .to_value()
            .map_err(|e| StorageError::serialization(key.clone(), e))?;
        self.inner.set(&key, value).await
    }

    /// Remove a consumed draft
    ///
    /// # Errors
    /// Propagates backend failures.
    pub async fn delete_draft(&self, plugin_id: &str) -> Result<(), StorageError> {
        self.inner.delete(&draft_key(plugin_id)).await
    }

    /// Persist a report result, overwriting the previous one
    ///
    /// # Errors
    /// Propagates backend and encoding failures.
    pub async fn save_result(
        &self,
        plugin_id: &str,
        result: &ReportResult,
    ) -> Result<(), StorageError> {
        let key = result_key(plugin_id);
        let value =
            serde_json::to_value(result).map_err(|e| StorageError::serialization(key.clone(), e))?;
        self.inner.set(&key, value).await
    }

    /// Latest report result
    ///
    /// # Errors
    /// Backend failures, or `StorageError::Serialization` for a malformed result.
    pub async fn load_result(&self, plugin_id: &str) -> Result<Option<ReportResult>, StorageError> {
        let key = result_key(plugin_id);
        match self.inner.get(&key).await? {
            Some(Value::Null) | None => Ok(None),
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| StorageError::serialization(key, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ReportData;
    use serde_json::json;

    fn store() -> (Arc<MemoryStore>, DraftStore) {
        let backend = Arc::new(MemoryStore::new());
        (backend.clone(), DraftStore::new(backend))
    }

    #[test]
    fn key_layout() {
        assert_eq!(draft_key("medlab"), "pluginDrafts:medlab");
        assert_eq!(result_key("medlab"), "pluginResults:medlab");
        assert_eq!(REPORT_LOGS_KEY, "reportLogs");
    }

    #[tokio::test]
    async fn draft_roundtrip_and_delete() {
        let (backend, drafts) = store();
        let draft = Draft::new(ReportData::with_summary("done"));

        drafts.save_draft("medlab", &draft).await.unwrap();
        assert!(backend.contains_key("pluginDrafts:medlab"));
        assert_eq!(drafts.load_draft("medlab").await.unwrap(), Some(draft));

        drafts.delete_draft("medlab").await.unwrap();
        assert!(!drafts.has_draft("medlab").await.unwrap());
    }

    #[tokio::test]
    async fn null_draft_is_absent() {
        let (backend, drafts) = store();
        backend.set("pluginDrafts:medlab", Value::Null).await.unwrap();
        assert!(drafts.load_draft("medlab").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn malformed_draft_is_serialization_error() {
        let (backend, drafts) = store();
        backend
            .set("pluginDrafts:medlab", json!({"reportData": {"aiLabSummary": 1}}))
            .await
            .unwrap();
        let err = drafts.load_draft("medlab").await.unwrap_err();
        assert!(matches!(err, StorageError::Serialization { .. }));
    }

    #[tokio::test]
    async fn backend_failure_propagates() {
        let mut mock = MockKeyValueStore::new();
        mock.expect_get()
            .returning(|_| Err(StorageError::Unavailable("offline".into())));
        let drafts = DraftStore::new(Arc::new(mock));

        let err = drafts.load_draft("medlab").await.unwrap_err();
        assert!(matches!(err, StorageError::Unavailable(_)));
    }

    #[tokio::test]
    async fn result_roundtrip() {
        let (_, drafts) = store();
        let result = ReportResult::succeeded("d1", "u1");
        drafts.save_result("medlab", &result).await.unwrap();
        assert_eq!(drafts.load_result("medlab").await.unwrap(), Some(result));
        assert!(drafts.load_result("other").await.unwrap().is_none());
    }
}
