//! Remote metadata sync
//!
//! After a report batch, each successful result is announced to the lab
//! backend as a [`MetadataRecord`]. Failures become `synced: false`
//! statuses; nothing is raised and nothing is retried.

use crate::error::SyncError;
use crate::reports::ReportResults;
use crate::types::{iso_timestamp_now, MetadataRecord, SyncStatus};
use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::Value;
use std::sync::Arc;

/// Status message when the endpoint does not supply one
pub const DEFAULT_SYNCED_MESSAGE: &str = "Successfully logged metadata.";

/// Status message for results that were not successful
pub const NOT_SUCCESSFUL_MESSAGE: &str =
    "Plugin execution not successful or success flag missing.";

/// Per-plugin sync statuses, in result order
pub type SyncStatuses = IndexMap<String, SyncStatus>;

/// Destination for report metadata
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MetadataSink: Send + Sync {
    /// Deliver one record, returning the endpoint's message if any
    async fn send(&self, record: &MetadataRecord) -> Result<Option<String>, SyncError>;
}

/// HTTP sink POSTing JSON to a fixed endpoint
#[derive(Debug, Clone)]
pub struct HttpMetadataSink {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpMetadataSink {
    /// Create sink for an endpoint
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    /// Create sink reusing an existing client
    #[must_use]
    pub fn with_client(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    /// Target endpoint
    #[inline]
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl MetadataSink for HttpMetadataSink {
    async fn send(&self, record: &MetadataRecord) -> Result<Option<String>, SyncError> {
        tracing::debug!(plugin_id = %record.plugin_id, endpoint = %self.endpoint, "Posting report metadata");

        let response = self
            .client
            .post(&self.endpoint)
            .json(record)
            .send()
            .await
            .map_err(|e| SyncError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SyncError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(SyncError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response_message(&body))
    }
}

/// `message` field of a JSON response body, if there is one
fn response_message(body: &str) -> Option<String> {
    serde_json::from_str::<Value>(body)
        .ok()?
        .get("message")?
        .as_str()
        .map(str::to_string)
}

/// Sync driver over a sink
#[derive(Clone)]
pub struct MetadataSync {
    sink: Arc<dyn MetadataSink>,
}

impl std::fmt::Debug for MetadataSync {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataSync").finish_non_exhaustive()
    }
}

impl MetadataSync {
    /// Create sync driver
    #[inline]
    #[must_use]
    pub fn new(sink: Arc<dyn MetadataSink>) -> Self {
        Self { sink }
    }

    /// Announce every successful report; one request per success, in order
    pub async fn sync_report_metadata(&self, results: &ReportResults) -> SyncStatuses {
        let mut statuses = SyncStatuses::new();

        for (plugin_id, result) in results {
            let status = if result.success {
                let record = MetadataRecord {
                    document_id: result.document_id.clone(),
                    url: result.url.clone(),
                    timestamp: iso_timestamp_now(),
                    plugin_id: plugin_id.clone(),
                };
                match self.sink.send(&record).await {
                    Ok(message) => {
                        tracing::info!(plugin_id = %plugin_id, "Logged report metadata");
                        SyncStatus::synced(message.unwrap_or_else(|| DEFAULT_SYNCED_MESSAGE.to_string()))
                    }
                    Err(e) => {
                        tracing::error!(plugin_id = %plugin_id, error = %e, "Error logging report metadata");
                        SyncStatus::not_synced(format!("Failed to log metadata: {e}"))
                    }
                }
            } else {
                SyncStatus::not_synced(
                    result
                        .error
                        .clone()
                        .unwrap_or_else(|| NOT_SUCCESSFUL_MESSAGE.to_string()),
                )
            };
            statuses.insert(plugin_id.clone(), status);
        }

        tracing::info!(count = statuses.len(), "Metadata sync finished");
        statuses
    }
}
