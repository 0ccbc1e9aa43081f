//! Batch enrichment
//!
//! Runs a [`DraftEnricher`] over a list of plugin entries, strictly one at a
//! time, and writes exactly one audit entry per valid entry in processing
//! order. A fault in one plugin never stops the batch.

use crate::audit::AuditLog;
use crate::enrichment::DraftEnricher;
use crate::types::{AuditLogEntry, Draft};
use indexmap::IndexMap;
use serde_json::Value;
use std::sync::Arc;

/// Per-plugin outcome: the (possibly enriched) draft, or `None` on failure
pub type EnrichmentOutcomes = IndexMap<String, Option<Draft>>;

/// Audit message recorded when enrichment produced no draft
#[must_use]
pub fn no_draft_message(plugin_id: &str) -> String {
    format!(
        "Plugin {plugin_id}: Enrichment process resulted in null or no changes \
         (e.g., no draft found or internal error during enrichment)."
    )
}

/// Sequential enrichment over many plugins
#[derive(Clone)]
pub struct BatchEnrichment {
    enricher: Arc<dyn DraftEnricher>,
    audit: AuditLog,
}

impl std::fmt::Debug for BatchEnrichment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchEnrichment")
            .field("audit", &self.audit)
            .finish_non_exhaustive()
    }
}

impl BatchEnrichment {
    /// Create orchestrator
    #[inline]
    #[must_use]
    pub fn new(enricher: Arc<dyn DraftEnricher>, audit: AuditLog) -> Self {
        Self { enricher, audit }
    }

    /// Enrich every entry of the form `{"id": "<plugin id>"}`
    ///
    /// Entries without a string `id` are skipped and leave no audit entry.
    /// A repeated id keeps its first position in the output and takes the
    /// latest outcome.
    pub async fn enrich_batch(&self, plugins: &[Value]) -> EnrichmentOutcomes {
        let mut outcomes = EnrichmentOutcomes::new();

        if plugins.is_empty() {
            tracing::info!("No ready plugins to process");
            return outcomes;
        }
        tracing::info!(count = plugins.len(), "Starting enrichment for ready plugins");

        for entry in plugins {
            let Some(plugin_id) = entry.get("id").and_then(Value::as_str) else {
                tracing::warn!(entry = %entry, "Invalid plugin entry or missing plugin id, skipping");
                continue;
            };

            let (outcome, error_message) = match self.enricher.enrich_draft(plugin_id).await {
                Ok(Some(draft)) => (Some(draft), None),
                Ok(None) => {
                    tracing::info!(plugin_id, "No draft or error, recording null outcome");
                    (None, Some(no_draft_message(plugin_id)))
                }
                Err(e) => {
                    tracing::error!(plugin_id, error = %e, "Unhandled error during enrichment");
                    (None, Some(e.to_string()))
                }
            };

            let success = outcome.is_some();
            outcomes.insert(plugin_id.to_string(), outcome);
            self.audit
                .append(&AuditLogEntry::now(plugin_id, success, error_message))
                .await;
        }

        tracing::info!(processed = outcomes.len(), "Finished enrichment for all plugins");
        outcomes
    }

    /// Enrich plugins by id
    pub async fn enrich_plugins<I, S>(&self, plugin_ids: I) -> EnrichmentOutcomes
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entries: Vec<Value> = plugin_ids
            .into_iter()
            .map(|id| serde_json::json!({ "id": id.as_ref() }))
            .collect();
        self.enrich_batch(&entries).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrichment::MockDraftEnricher;
    use crate::error::EnrichmentError;
    use crate::store::MemoryStore;
    use crate::types::ReportData;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn batch(enricher: MockDraftEnricher) -> (Arc<MemoryStore>, BatchEnrichment) {
        let store = Arc::new(MemoryStore::new());
        let batch = BatchEnrichment::new(Arc::new(enricher), AuditLog::new(store.clone()));
        (store, batch)
    }

    async fn logged(store: &Arc<MemoryStore>) -> Vec<AuditLogEntry> {
        AuditLog::new(store.clone()).entries().await
    }

    #[tokio::test]
    async fn mixed_outcomes_are_each_logged_in_order() {
        let mut enricher = MockDraftEnricher::new();
        enricher.expect_enrich_draft().returning(|id| match id {
            "ok" => Ok(Some(Draft::new(ReportData::with_summary("s")))),
            "ghost" => Ok(None),
            _ => Err(EnrichmentError::Failed("Test error".into())),
        });
        let (store, batch) = batch(enricher);

        let out = batch
            .enrich_batch(&[json!({"id": "ok"}), json!({"id": "ghost"}), json!({"id": "boom"})])
            .await;

        assert_eq!(out.keys().collect::<Vec<_>>(), vec!["ok", "ghost", "boom"]);
        assert!(out["ok"].is_some());
        assert!(out["ghost"].is_none());
        assert!(out["boom"].is_none());

        let logs = logged(&store).await;
        let summary: Vec<_> = logs
            .iter()
            .map(|e| (e.plugin_id.as_str(), e.success, e.error_message.clone()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("ok", true, None),
                ("ghost", false, Some(no_draft_message("ghost"))),
                ("boom", false, Some("Test error".to_string())),
            ]
        );
    }

    #[tokio::test]
    async fn invalid_entries_are_skipped_without_log() {
        let mut enricher = MockDraftEnricher::new();
        enricher
            .expect_enrich_draft()
            .times(1)
            .returning(|_| Ok(Some(Draft::default())));
        let (store, batch) = batch(enricher);

        let out = batch
            .enrich_batch(&[json!(null), json!({"name": "x"}), json!({"id": 5}), json!({"id": "p"})])
            .await;

        assert_eq!(out.len(), 1);
        assert_eq!(logged(&store).await.len(), 1);
    }

    #[tokio::test]
    async fn empty_batch_does_nothing() {
        let mut enricher = MockDraftEnricher::new();
        enricher.expect_enrich_draft().never();
        let (store, batch) = batch(enricher);

        assert!(batch.enrich_batch(&[]).await.is_empty());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn repeated_id_keeps_first_position_and_logs_twice() {
        let mut enricher = MockDraftEnricher::new();
        let mut calls = 0;
        enricher.expect_enrich_draft().returning(move |_| {
            calls += 1;
            if calls == 1 {
                Ok(None)
            } else {
                Ok(Some(Draft::default()))
            }
        });
        let (store, batch) = batch(enricher);

        let out = batch.enrich_plugins(["a", "b", "a"]).await;
        assert_eq!(out.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert!(out["a"].is_some());
        assert_eq!(logged(&store).await.len(), 3);
    }

    #[tokio::test]
    async fn audit_timestamps_are_iso8601() {
        let mut enricher = MockDraftEnricher::new();
        enricher.expect_enrich_draft().returning(|_| Ok(None));
        let (store, batch) = batch(enricher);

        batch.enrich_plugins(["ghost"]).await;
        let logs = logged(&store).await;
        assert!(chrono::DateTime::parse_from_rfc3339(&logs[0].timestamp).is_ok());
    }
}
