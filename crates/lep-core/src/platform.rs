//! Background platform
//!
//! Wires the pipeline together over one shared store:
//! - Enrichment engine and batch orchestrator
//! - Report orchestrator over the plugin registry
//! - Metadata sync towards the lab backend
//! - UI message dispatch

use crate::audit::AuditLog;
use crate::backends::{ClientFactory, InMemoryDocumentClient, PlaceholderSummaryGenerator, SummaryGenerator};
use crate::batch::{BatchEnrichment, EnrichmentOutcomes};
use crate::config::PlatformConfig;
use crate::enrichment::{DraftEnricher, EnrichmentEngine};
use crate::error::EnrichmentError;
use crate::message::{BackgroundRequest, BackgroundResponse};
use crate::ready::ready_plugins;
use crate::registry::PluginRegistry;
use crate::reports::{ReportOrchestrator, ReportResults};
use crate::store::{DraftStore, KeyValueStore};
use crate::sync::{HttpMetadataSink, MetadataSink, MetadataSync, SyncStatuses};
use crate::types::{AuditLogEntry, Draft};
use serde_json::Value;
use std::sync::Arc;

/// The assembled pipeline
#[derive(Debug, Clone)]
pub struct Platform {
    /// Configuration
    config: PlatformConfig,
    /// Shared draft and result storage
    store: DraftStore,
    /// Per-plugin enrichment
    engine: Arc<EnrichmentEngine>,
    /// Batch enrichment with audit logging
    batch: BatchEnrichment,
    /// Report generation
    reports: ReportOrchestrator,
    /// Remote metadata sync
    sync: MetadataSync,
    /// Audit log view
    audit: AuditLog,
}

impl Platform {
    /// Create platform with the bundled backends
    ///
    /// Registers the default plugins, uses the placeholder summary
    /// generator with the configured delay, the in-memory document client
    /// and an HTTP sink for the configured endpoint.
    #[must_use]
    pub fn new(config: PlatformConfig, store: Arc<dyn KeyValueStore>) -> Self {
        PlatformBuilder::new(config, store).build()
    }

    /// Start a builder for custom backends
    #[inline]
    #[must_use]
    pub fn builder(config: PlatformConfig, store: Arc<dyn KeyValueStore>) -> PlatformBuilder {
        PlatformBuilder::new(config, store)
    }

    /// Configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &PlatformConfig {
        &self.config
    }

    /// Plugin registry
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &PluginRegistry {
        self.reports.registry()
    }

    /// Draft store
    #[inline]
    #[must_use]
    pub fn store(&self) -> &DraftStore {
        &self.store
    }

    /// Enrich one plugin's draft
    ///
    /// # Errors
    /// Returns `EnrichmentError` only for faults such as an undecodable draft.
    pub async fn enrich_draft(&self, plugin_id: &str) -> Result<Option<Draft>, EnrichmentError> {
        self.engine.enrich_draft(plugin_id).await
    }

    /// Enrich a batch of `{"id": ...}` entries
    pub async fn enrich_batch(&self, plugins: &[Value]) -> EnrichmentOutcomes {
        self.batch.enrich_batch(plugins).await
    }

    /// Enrich plugins by id
    pub async fn enrich_plugins<I, S>(&self, plugin_ids: I) -> EnrichmentOutcomes
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.batch.enrich_plugins(plugin_ids).await
    }

    /// Generate reports; `None` uses the configured debug mode
    pub async fn generate_all_reports<I, S>(&self, plugin_ids: I, debug_mode: Option<bool>) -> ReportResults
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let debug_mode = debug_mode.unwrap_or(self.config.debug_mode);
        self.reports.generate_all_reports(plugin_ids, debug_mode).await
    }

    /// Registered plugins that currently hold a draft
    pub async fn ready_plugins(&self) -> Vec<String> {
        ready_plugins(self.registry(), &self.store).await
    }

    /// Audit entries recorded so far
    pub async fn audit_entries(&self) -> Vec<AuditLogEntry> {
        self.audit.entries().await
    }

    /// Announce successful reports to the lab backend
    pub async fn sync_report_metadata(&self, results: &ReportResults) -> SyncStatuses {
        self.sync.sync_report_metadata(results).await
    }

    /// Handle a raw UI message
    ///
    /// Malformed requests produce an error response before anything runs.
    pub async fn handle_message(&self, request: &Value) -> BackgroundResponse {
        match BackgroundRequest::parse(request) {
            Ok(request) => self.dispatch(request).await,
            Err(e) => {
                tracing::warn!(error = %e, "Rejected message");
                e.into()
            }
        }
    }

    /// Run a decoded request
    pub async fn dispatch(&self, request: BackgroundRequest) -> BackgroundResponse {
        match request {
            BackgroundRequest::GenerateAllReports {
                ready_plugins,
                debug_mode,
            } => {
                tracing::info!(count = ready_plugins.len(), "Handling generateAllReports");
                let results = self.generate_all_reports(&ready_plugins, debug_mode).await;
                BackgroundResponse::Results { results }
            }
            BackgroundRequest::TriggerEnrichment { plugins } => {
                tracing::info!(count = plugins.len(), "Handling triggerEnrichment");
                let drafts = self.enrich_batch(&plugins).await;
                BackgroundResponse::Drafts { drafts }
            }
        }
    }
}

/// Builder for [`Platform`] with swappable backends
pub struct PlatformBuilder {
    config: PlatformConfig,
    store: Arc<dyn KeyValueStore>,
    registry: Option<PluginRegistry>,
    generator: Option<Arc<dyn SummaryGenerator>>,
    client_factory: Option<ClientFactory>,
    sink: Option<Arc<dyn MetadataSink>>,
}

impl std::fmt::Debug for PlatformBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlatformBuilder")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl PlatformBuilder {
    /// Create builder
    #[inline]
    #[must_use]
    pub fn new(config: PlatformConfig, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            config,
            store,
            registry: None,
            generator: None,
            client_factory: None,
            sink: None,
        }
    }

    /// With plugin registry
    #[inline]
    #[must_use]
    pub fn with_registry(mut self, registry: PluginRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// With summary generator
    #[inline]
    #[must_use]
    pub fn with_generator(mut self, generator: Arc<dyn SummaryGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// With document client factory
    #[inline]
    #[must_use]
    pub fn with_client_factory(mut self, factory: ClientFactory) -> Self {
        self.client_factory = Some(factory);
        self
    }

    /// With metadata sink
    #[inline]
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn MetadataSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Assemble the platform
    #[must_use]
    pub fn build(self) -> Platform {
        let Self {
            config,
            store,
            registry,
            generator,
            client_factory,
            sink,
        } = self;

        let registry = Arc::new(registry.unwrap_or_else(PluginRegistry::with_defaults));
        let generator = generator.unwrap_or_else(|| {
            Arc::new(PlaceholderSummaryGenerator::new(config.generation_delay())) as Arc<dyn SummaryGenerator>
        });
        let client_factory = client_factory.unwrap_or_else(InMemoryDocumentClient::factory);
        let sink = sink.unwrap_or_else(|| {
            Arc::new(HttpMetadataSink::new(config.metadata_endpoint.clone())) as Arc<dyn MetadataSink>
        });

        let drafts = DraftStore::new(store.clone());
        let audit = AuditLog::new(store);
        let engine = Arc::new(EnrichmentEngine::new(drafts.clone(), generator));

        tracing::debug!(
            plugins = registry.len(),
            debug_mode = config.debug_mode,
            "Platform assembled"
        );

        Platform {
            batch: BatchEnrichment::new(engine.clone(), audit.clone()),
            reports: ReportOrchestrator::new(registry, drafts.clone(), client_factory),
            sync: MetadataSync::new(sink),
            engine,
            audit,
            store: drafts,
            config,
        }
    }
}
