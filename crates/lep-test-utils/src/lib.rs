//! Testing utilities for LEP workspace
//!
//! Shared test helpers, fixtures, and scripted backends.

#![allow(missing_docs)]

use async_trait::async_trait;
use lep_core::backends::{ClientFactory, DocumentClient, InMemoryDocumentClient, SummaryGenerator};
use lep_core::error::{GenerationError, PluginError, StorageError, SyncError};
use lep_core::registry::{PluginDescriptor, PluginRegistry, ReportPlugin};
use lep_core::store::{KeyValueStore, MemoryStore};
use lep_core::sync::MetadataSink;
use lep_core::types::{Draft, MetadataRecord, ReportResult};
use lep_core::{Platform, PlatformConfig};
use parking_lot::Mutex;
use serde_json::{json, Map, Value};
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Which operations a [`FailingStore`] should fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    Get,
    Set,
    Delete,
}

/// Memory store that fails chosen operations on chosen keys
#[derive(Debug, Default)]
pub struct FailingStore {
    inner: MemoryStore,
    failures: Mutex<HashSet<(StoreOp, String)>>,
}

impl FailingStore {
    pub fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            failures: Mutex::new(HashSet::new()),
        }
    }

    /// Fail `op` on `key` from now on
    pub fn fail(&self, op: StoreOp, key: impl Into<String>) {
        self.failures.lock().insert((op, key.into()));
    }

    pub fn inner(&self) -> &MemoryStore {
        &self.inner
    }

    fn check(&self, op: StoreOp, key: &str) -> Result<(), StorageError> {
        if self.failures.lock().contains(&(op, key.to_string())) {
            Err(StorageError::backend(key, format!("injected {op:?} failure")))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl KeyValueStore for FailingStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        self.check(StoreOp::Get, key)?;
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StorageError> {
        self.check(StoreOp::Set, key)?;
        self.inner.set(key, value).await
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.check(StoreOp::Delete, key)?;
        self.inner.delete(key).await
    }
}

/// Generator replaying queued outcomes, then returning `None`
#[derive(Debug, Default)]
pub struct ScriptedGenerator {
    outcomes: Mutex<VecDeque<Result<Option<String>, GenerationError>>>,
    calls: AtomicUsize,
    contexts: Mutex<Vec<Map<String, Value>>>,
}

impl ScriptedGenerator {
    pub fn new(outcomes: impl IntoIterator<Item = Result<Option<String>, GenerationError>>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into_iter().collect()),
            ..Self::default()
        }
    }

    /// Generator that always answers with `text`
    pub fn always(text: &str, times: usize) -> Self {
        Self::new((0..times).map(|_| Ok(Some(text.to_string()))))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Contexts received, in call order
    pub fn contexts(&self) -> Vec<Map<String, Value>> {
        self.contexts.lock().clone()
    }
}

#[async_trait]
impl SummaryGenerator for ScriptedGenerator {
    async fn generate(&self, context: &Map<String, Value>) -> Result<Option<String>, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.contexts.lock().push(context.clone());
        self.outcomes.lock().pop_front().unwrap_or(Ok(None))
    }
}

/// Plugin returning a fixed outcome and counting runs
#[derive(Debug)]
pub struct ScriptedPlugin {
    outcome: Result<ReportResult, String>,
    runs: AtomicUsize,
}

impl ScriptedPlugin {
    pub fn succeeding(document_id: &str, url: &str) -> Arc<Self> {
        Arc::new(Self {
            outcome: Ok(ReportResult::succeeded(document_id, url)),
            runs: AtomicUsize::new(0),
        })
    }

    pub fn unsuccessful(error: &str) -> Arc<Self> {
        Arc::new(Self {
            outcome: Ok(ReportResult::failed(error)),
            runs: AtomicUsize::new(0),
        })
    }

    /// Plugin whose run faults with `message`
    pub fn faulting(message: &str) -> Arc<Self> {
        Arc::new(Self {
            outcome: Err(message.to_string()),
            runs: AtomicUsize::new(0),
        })
    }

    pub fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReportPlugin for ScriptedPlugin {
    async fn run(&self, _draft: &Draft, _client: &dyn DocumentClient) -> Result<ReportResult, PluginError> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        self.outcome.clone().map_err(PluginError::Failed)
    }
}

/// Sink recording every record it receives
#[derive(Debug, Default)]
pub struct RecordingSink {
    records: Mutex<Vec<MetadataRecord>>,
    failure: Option<u16>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sink answering every request with HTTP `status`
    pub fn failing(status: u16) -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            failure: Some(status),
        }
    }

    pub fn records(&self) -> Vec<MetadataRecord> {
        self.records.lock().clone()
    }
}

#[async_trait]
impl MetadataSink for RecordingSink {
    async fn send(&self, record: &MetadataRecord) -> Result<Option<String>, SyncError> {
        self.records.lock().push(record.clone());
        match self.failure {
            Some(status) => Err(SyncError::Status {
                status,
                body: "rejected".into(),
            }),
            None => Ok(Some(format!("logged {}", record.plugin_id))),
        }
    }
}

/// Factory handing out one shared client so tests can inspect documents
pub fn shared_client_factory(client: Arc<InMemoryDocumentClient>) -> ClientFactory {
    Arc::new(move || client.clone() as Arc<dyn DocumentClient>)
}

/// Registry of scripted plugins
pub fn registry_of(plugins: Vec<(&str, Arc<ScriptedPlugin>)>) -> PluginRegistry {
    plugins.into_iter().fold(PluginRegistry::new(), |registry, (id, plugin)| {
        registry.with_plugin(PluginDescriptor::new(id, id, plugin))
    })
}

/// Raw MedLab draft with the given summary
pub fn medlab_draft_value(summary: &str) -> Value {
    json!({
        "reportData": {
            "patientName": "Jane Doe",
            "testName": "CBC",
            "result": "normal",
            "aiLabSummary": summary,
        }
    })
}

pub fn medlab_draft(summary: &str) -> Draft {
    Draft::from_value(medlab_draft_value(summary)).unwrap()
}

/// Store seeded with raw drafts
pub fn store_with_drafts(drafts: &[(&str, Value)]) -> Arc<MemoryStore> {
    Arc::new(MemoryStore::with_entries(
        drafts
            .iter()
            .map(|(id, draft)| (format!("pluginDrafts:{id}"), draft.clone())),
    ))
}

/// Platform over `store` with a scripted generator and recording sink
pub fn setup_test_platform(
    store: Arc<dyn KeyValueStore>,
    generator: Arc<ScriptedGenerator>,
    sink: Arc<RecordingSink>,
) -> Platform {
    Platform::builder(PlatformConfig::new(), store)
        .with_generator(generator)
        .with_sink(sink)
        .build()
}
