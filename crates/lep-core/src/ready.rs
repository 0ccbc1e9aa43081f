//! Ready-plugin scan
//!
//! A registered plugin is ready when its draft key holds a non-null value.

use crate::registry::PluginRegistry;
use crate::store::DraftStore;

/// Ids of registered plugins that currently have a draft, in registration order
///
/// A storage error for one plugin is logged and that plugin counts as not ready.
pub async fn ready_plugins(registry: &PluginRegistry, store: &DraftStore) -> Vec<String> {
    if registry.is_empty() {
        tracing::warn!("Plugin registry is empty, no ready plugins");
        return Vec::new();
    }

    let mut ready = Vec::new();
    for descriptor in registry.iter() {
        match store.has_draft(&descriptor.id).await {
            Ok(true) => ready.push(descriptor.id.clone()),
            Ok(false) => {}
            Err(e) => {
                tracing::error!(plugin_id = %descriptor.id, error = %e, "Error accessing draft storage");
            }
        }
    }
    tracing::debug!(count = ready.len(), "Ready plugins found");
    ready
}
