//! Draft enrichment
//!
//! Fills in a plugin draft's `aiLabSummary` when it is missing or still one
//! of the known placeholder texts. Enrichment is best-effort:
//! - no draft → `Ok(None)`
//! - generation yields nothing, or the write fails → original draft
//! - a non-object draft has no report data and is returned unchanged
//! - only an object draft whose `reportData` has the wrong shape is a fault
//!
//! At most one store write per call; drafts are never deleted here.

use crate::backends::SummaryGenerator;
use crate::error::{EnrichmentError, StorageError};
use crate::store::DraftStore;
use crate::types::Draft;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Summary texts that mean "no real content yet"
pub const PLACEHOLDER_SUMMARIES: [&str; 4] = [
    "",
    "No summary provided.",
    "Enter AI lab analysis results here...",
    "No AI Lab Summary data available from previous API call. Please run the lab analysis first to populate this section with detailed findings and recommendations.",
];

/// Whether a summary is missing or a placeholder
///
/// Both sides are trimmed before an exact comparison.
#[must_use]
pub fn is_placeholder_summary(summary: Option<&str>) -> bool {
    let current = summary.map_or("", str::trim);
    PLACEHOLDER_SUMMARIES
        .iter()
        .any(|placeholder| placeholder.trim() == current)
}

/// Per-plugin draft enrichment
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DraftEnricher: Send + Sync {
    /// Enrich the draft of one plugin
    ///
    /// `Ok(None)` when the plugin has no draft.
    async fn enrich_draft(&self, plugin_id: &str) -> Result<Option<Draft>, EnrichmentError>;
}

/// Enrichment engine over a draft store and a summary generator
#[derive(Clone)]
pub struct EnrichmentEngine {
    store: DraftStore,
    generator: Arc<dyn SummaryGenerator>,
}

impl std::fmt::Debug for EnrichmentEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnrichmentEngine")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

impl EnrichmentEngine {
    /// Create engine
    #[inline]
    #[must_use]
    pub fn new(store: DraftStore, generator: Arc<dyn SummaryGenerator>) -> Self {
        Self { store, generator }
    }

    /// Load the draft, degrading read failures to "no draft"
    async fn load(&self, plugin_id: &str) -> Result<Option<Draft>, EnrichmentError> {
        match self.store.load_draft(plugin_id).await {
            Ok(Some(draft)) if draft.opaque.as_ref().is_some_and(is_falsy) => Ok(None),
            Ok(draft) => Ok(draft),
            Err(StorageError::Serialization { source, .. }) => Err(EnrichmentError::MalformedDraft {
                plugin_id: plugin_id.to_string(),
                source,
            }),
            Err(e) => {
                tracing::error!(plugin_id, error = %e, "Error retrieving draft");
                Ok(None)
            }
        }
    }
}

/// `false`, `0` and `""` stored as a draft count as no draft
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => true,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

#[async_trait]
impl DraftEnricher for EnrichmentEngine {
    async fn enrich_draft(&self, plugin_id: &str) -> Result<Option<Draft>, EnrichmentError> {
        tracing::info!(plugin_id, "Starting enrichment");

        let Some(draft) = self.load(plugin_id).await? else {
            tracing::warn!(plugin_id, "No draft data found, skipping enrichment");
            return Ok(None);
        };

        let Some(report_data) = draft.report_data.as_ref() else {
            tracing::warn!(plugin_id, "No reportData in draft, skipping enrichment");
            return Ok(Some(draft));
        };

        if !is_placeholder_summary(report_data.ai_lab_summary.as_deref()) {
            tracing::debug!(plugin_id, "Summary already present, no enrichment needed");
            return Ok(Some(draft));
        }

        tracing::info!(plugin_id, "Summary missing or placeholder, requesting generation");
        let context = report_data.generation_context();
        let summary = match self.generator.generate(&context).await {
            Ok(Some(summary)) if !summary.is_empty() => summary,
            Ok(_) => {
                tracing::error!(plugin_id, "Summary generation returned no content");
                return Ok(Some(draft));
            }
            Err(e) => {
                tracing::error!(plugin_id, error = %e, "Summary generation failed");
                return Ok(Some(draft));
            }
        };

        let mut updated = draft.clone();
        if let Some(data) = updated.report_data.as_mut() {
            data.ai_lab_summary = Some(summary);
        }

        match self.store.save_draft(plugin_id, &updated).await {
            Ok(()) => {
                tracing::info!(plugin_id, "Enriched and saved draft");
                Ok(Some(updated))
            }
            Err(e) => {
                tracing::error!(plugin_id, error = %e, "Failed to save enriched draft, returning original");
                Ok(Some(draft))
            }
        }
    }
}
