//! Audit log of per-plugin enrichment outcomes
//!
//! The log is a single JSON array under `reportLogs`. Appending is a
//! read-modify-write: a failed or non-array read starts from an empty list,
//! a failed write is logged and dropped. Existing entries are carried over
//! verbatim even when they are not [`AuditLogEntry`]-shaped.

use crate::store::{KeyValueStore, REPORT_LOGS_KEY};
use crate::types::AuditLogEntry;
use serde_json::Value;
use std::sync::Arc;

/// Append-only audit log over a shared store
#[derive(Clone)]
pub struct AuditLog {
    store: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for AuditLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditLog").finish_non_exhaustive()
    }
}

impl AuditLog {
    /// Create log over a store
    #[inline]
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Append one entry; never fails
    pub async fn append(&self, entry: &AuditLogEntry) {
        let plugin_id = entry.plugin_id.as_str();

        let mut logs = match self.store.get(REPORT_LOGS_KEY).await {
            Ok(Some(Value::Array(logs))) => logs,
            Ok(_) => Vec::new(),
            Err(e) => {
                tracing::error!(plugin_id, error = %e, "Error retrieving report logs");
                Vec::new()
            }
        };

        match serde_json::to_value(entry) {
            Ok(value) => logs.push(value),
            Err(e) => {
                tracing::error!(plugin_id, error = %e, "Could not encode audit entry");
                return;
            }
        }

        let total = logs.len();
        match self.store.set(REPORT_LOGS_KEY, Value::Array(logs)).await {
            Ok(()) => tracing::debug!(plugin_id, total, "Report metadata logged"),
            Err(e) => tracing::error!(plugin_id, error = %e, "Error saving report logs"),
        }
    }

    /// All well-formed entries, oldest first
    ///
    /// Read failures and foreign entries are skipped.
    pub async fn entries(&self) -> Vec<AuditLogEntry> {
        match self.store.get(REPORT_LOGS_KEY).await {
            Ok(Some(Value::Array(logs))) => logs
                .into_iter()
                .filter_map(|v| serde_json::from_value(v).ok())
                .collect(),
            Ok(_) => Vec::new(),
            Err(e) => {
                tracing::error!(error = %e, "Error retrieving report logs");
                Vec::new()
            }
        }
    }
}
