//! Plugin registry
//!
//! Provides [`PluginRegistry`], the ordered id → [`PluginDescriptor`] map the
//! orchestrators look plugins up in. Registration is explicit construction;
//! descriptors are never mutated once registered.

use crate::backends::DocumentClient;
use crate::error::PluginError;
use crate::types::{Draft, ReportResult};
use async_trait::async_trait;
use indexmap::IndexMap;
use std::sync::Arc;

/// Report generator capability
///
/// Implement this trait to turn a draft into a report document.
#[async_trait]
pub trait ReportPlugin: Send + Sync {
    /// Produce a report from a draft using the batch's document client
    ///
    /// Returning `Err` is a plugin fault: the orchestrator records a failure
    /// result and leaves the draft in place.
    async fn run(
        &self,
        draft: &Draft,
        client: &dyn DocumentClient,
    ) -> Result<ReportResult, PluginError>;
}

/// A registered plugin
#[derive(Clone)]
pub struct PluginDescriptor {
    /// Unique, stable identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Short description
    pub description: String,
    runner: Arc<dyn ReportPlugin>,
}

impl std::fmt::Debug for PluginDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginDescriptor")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

impl PluginDescriptor {
    /// Create descriptor
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        runner: Arc<dyn ReportPlugin>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            runner,
        }
    }

    /// With description
    #[inline]
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Invoke the plugin
    ///
    /// # Errors
    /// Whatever the plugin faults with.
    pub async fn run(
        &self,
        draft: &Draft,
        client: &dyn DocumentClient,
    ) -> Result<ReportResult, PluginError> {
        self.runner.run(draft, client).await
    }
}

/// Registry of available report plugins, in registration order
#[derive(Debug, Default, Clone)]
pub struct PluginRegistry {
    plugins: IndexMap<String, PluginDescriptor>,
}

impl PluginRegistry {
    /// Create new empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            plugins: IndexMap::new(),
        }
    }

    /// Create registry with built-in plugins
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(crate::plugins::medlab::descriptor());
        registry
    }

    /// Register a plugin
    ///
    /// Returns `false` and keeps the existing descriptor if the id is taken.
    pub fn register(&mut self, descriptor: PluginDescriptor) -> bool {
        if self.plugins.contains_key(&descriptor.id) {
            tracing::warn!(plugin_id = %descriptor.id, "Plugin id already registered, ignoring");
            return false;
        }
        self.plugins.insert(descriptor.id.clone(), descriptor);
        true
    }

    /// Builder form of [`register`](Self::register)
    #[must_use]
    pub fn with_plugin(mut self, descriptor: PluginDescriptor) -> Self {
        self.register(descriptor);
        self
    }

    /// Look up plugin by id
    #[inline]
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&PluginDescriptor> {
        self.plugins.get(id)
    }

    /// Check if plugin exists
    #[inline]
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.plugins.contains_key(id)
    }

    /// Registered ids, in registration order
    #[inline]
    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        self.plugins.keys().map(String::as_str).collect()
    }

    /// Get number of registered plugins
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// Check if registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Iterate over descriptors in registration order
    pub fn iter(&self) -> impl Iterator<Item = &PluginDescriptor> {
        self.plugins.values()
    }
}
