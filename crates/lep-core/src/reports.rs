//! Report generation
//!
//! For each requested plugin, in order:
//! 1. Look the plugin up (unknown → `"not found"` result, no storage access)
//! 2. Load its draft (absent or unreadable → failure result, plugin not run)
//! 3. Run it with the batch's shared document client
//! 4. Persist the result; consume the draft unless in debug mode
//!
//! A plugin fault is persisted as a failure result and leaves the draft in
//! place. Nothing escapes [`ReportOrchestrator::generate_all_reports`].

use crate::backends::{ClientFactory, DocumentClient};
use crate::registry::PluginRegistry;
use crate::store::DraftStore;
use crate::types::ReportResult;
use indexmap::IndexMap;
use std::sync::Arc;

/// Error text for ids missing from the registry
pub const NOT_FOUND_ERROR: &str = "not found";

/// Per-plugin report results, in request order
pub type ReportResults = IndexMap<String, ReportResult>;

/// Sequential report orchestrator
#[derive(Clone)]
pub struct ReportOrchestrator {
    registry: Arc<PluginRegistry>,
    store: DraftStore,
    client_factory: ClientFactory,
}

impl std::fmt::Debug for ReportOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportOrchestrator")
            .field("registry", &self.registry)
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

impl ReportOrchestrator {
    /// Create orchestrator
    #[inline]
    #[must_use]
    pub fn new(
        registry: Arc<PluginRegistry>,
        store: DraftStore,
        client_factory: ClientFactory,
    ) -> Self {
        Self {
            registry,
            store,
            client_factory,
        }
    }

    /// Registry this orchestrator resolves ids against
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    /// Generate reports for every id
    ///
    /// One document client is built for the whole call. Repeated ids are
    /// processed once.
    pub async fn generate_all_reports<I, S>(&self, plugin_ids: I, debug_mode: bool) -> ReportResults
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let client = (self.client_factory)();
        let mut results = ReportResults::new();

        for plugin_id in plugin_ids {
            let plugin_id = plugin_id.as_ref();
            if results.contains_key(plugin_id) {
                tracing::warn!(plugin_id, "Plugin requested more than once, skipping repeat");
                continue;
            }
            let result = self.generate_one(plugin_id, client.as_ref(), debug_mode).await;
            results.insert(plugin_id.to_string(), result);
        }

        tracing::info!(
            total = results.len(),
            succeeded = results.values().filter(|r| r.success).count(),
            debug_mode,
            "Report generation finished"
        );
        results
    }

    async fn generate_one(
        &self,
        plugin_id: &str,
        client: &dyn DocumentClient,
        debug_mode: bool,
    ) -> ReportResult {
        let Some(descriptor) = self.registry.get(plugin_id) else {
            tracing::warn!(plugin_id, "Plugin not found in registry");
            return ReportResult::failed(NOT_FOUND_ERROR);
        };

        let draft = match self.store.load_draft(plugin_id).await {
            Ok(Some(draft)) => draft,
            Ok(None) => {
                tracing::warn!(plugin_id, "No draft data found");
                return ReportResult::failed(format!("No draft data found for plugin {plugin_id}"));
            }
            Err(e) => {
                tracing::error!(plugin_id, error = %e, "Error retrieving draft");
                return ReportResult::failed(format!(
                    "Failed to load draft for plugin {plugin_id}: {e}"
                ));
            }
        };

        tracing::info!(plugin_id, name = %descriptor.name, "Running plugin");
        match descriptor.run(&draft, client).await {
            Ok(result) => {
                self.persist(plugin_id, &result).await;
                if debug_mode {
                    tracing::debug!(plugin_id, "Debug mode, keeping draft");
                } else if let Err(e) = self.store.delete_draft(plugin_id).await {
                    tracing::warn!(plugin_id, error = %e, "Failed to delete consumed draft");
                }
                result
            }
            Err(e) => {
                tracing::error!(plugin_id, error = %e, "Plugin run failed");
                let result = ReportResult::failed(e.to_string());
                self.persist(plugin_id, &result).await;
                result
            }
        }
    }

    async fn persist(&self, plugin_id: &str, result: &ReportResult) {
        if let Err(e) = self.store.save_result(plugin_id, result).await {
            tracing::warn!(plugin_id, error = %e, "Failed to persist report result");
        }
    }
}
