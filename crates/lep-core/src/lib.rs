//! LEP Core - Lab report Enrichment Platform
//!
//! The background pipeline of a plugin-based report extension:
//! - Enriches stored drafts with generated summaries
//! - Runs report plugins over enriched drafts
//! - Keeps an audit log of enrichment outcomes
//! - Syncs report metadata to a remote backend
//! - Answers UI messages
//!
//! # Example
//!
//! ```rust,ignore
//! use lep_core::{MemoryStore, Platform, PlatformConfig};
//! use std::sync::Arc;
//!
//! # async fn example() {
//! let platform = Platform::new(PlatformConfig::new(), Arc::new(MemoryStore::new()));
//!
//! let ready = platform.ready_plugins().await;
//! platform.enrich_plugins(&ready).await;
//! let results = platform.generate_all_reports(&ready, None).await;
//!
//! println!("Generated {} reports", results.len());
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod audit;
pub mod backends;
pub mod batch;
pub mod config;
pub mod enrichment;
pub mod error;
pub mod message;
pub mod platform;
pub mod plugins;
pub mod ready;
pub mod registry;
pub mod reports;
pub mod store;
pub mod sync;
pub mod types;

// Re-exports for convenience
pub use audit::AuditLog;
pub use backends::{
    ClientFactory, ContentBlock, DocumentClient, InMemoryDocumentClient,
    PlaceholderSummaryGenerator, SummaryGenerator,
};
pub use batch::{BatchEnrichment, EnrichmentOutcomes};
pub use config::PlatformConfig;
pub use enrichment::{is_placeholder_summary, DraftEnricher, EnrichmentEngine};
pub use error::{
    ConfigError, DocumentError, EnrichmentError, GenerationError, MessageError, PlatformError,
    PluginError, StorageError, SyncError,
};
pub use message::{BackgroundRequest, BackgroundResponse};
pub use platform::{Platform, PlatformBuilder};
pub use ready::ready_plugins;
pub use registry::{PluginDescriptor, PluginRegistry, ReportPlugin};
pub use reports::{ReportOrchestrator, ReportResults};
pub use store::{DraftStore, JsonFileStore, KeyValueStore, MemoryStore};
pub use sync::{HttpMetadataSink, MetadataSink, MetadataSync, SyncStatuses};
pub use types::{AuditLogEntry, Draft, MetadataRecord, ReportData, ReportResult, SyncStatus};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with LEP Core
    pub use crate::{
        BackgroundResponse, Draft, DraftStore, KeyValueStore, MemoryStore, Platform,
        PlatformConfig, PluginDescriptor, PluginRegistry, ReportData, ReportPlugin, ReportResult,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
