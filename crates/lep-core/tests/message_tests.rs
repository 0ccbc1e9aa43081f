//! Tests for the UI message boundary.
//!
//! - Well-formed requests dispatch to the matching pipeline.
//! - Omitted `debugMode` falls back to configuration.
//! - Malformed requests answer `{error}` and leave storage untouched.

use lep_core::store::draft_key;
use lep_core::{Platform, PlatformConfig};
use lep_test_utils::{medlab_draft_value, registry_of, store_with_drafts, ScriptedGenerator, ScriptedPlugin};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::Arc;

fn platform(config: PlatformConfig, store: Arc<lep_core::MemoryStore>) -> Platform {
    Platform::builder(config, store)
        .with_registry(registry_of(vec![("medlab", ScriptedPlugin::succeeding("d1", "u1"))]))
        .with_generator(Arc::new(ScriptedGenerator::always("X", 1)))
        .build()
}

async fn send(platform: &Platform, request: Value) -> Value {
    serde_json::to_value(platform.handle_message(&request).await).unwrap()
}

#[tokio::test]
async fn generate_all_reports_message() {
    let store = store_with_drafts(&[("medlab", medlab_draft_value("ok"))]);
    let platform = platform(PlatformConfig::new(), store.clone());

    let response = send(
        &platform,
        json!({"action": "generateAllReports", "payload": {"readyPlugins": ["medlab"], "debugMode": false}}),
    )
    .await;

    assert_eq!(
        response,
        json!({"results": {"medlab": {"success": true, "documentId": "d1", "url": "u1", "error": null}}})
    );
    assert!(!store.contains_key(&draft_key("medlab")));
}

#[tokio::test]
async fn omitted_debug_mode_uses_config() {
    let store = store_with_drafts(&[("medlab", medlab_draft_value("ok"))]);
    let platform = platform(PlatformConfig::new().with_debug_mode(true), store.clone());

    send(
        &platform,
        json!({"action": "generateAllReports", "payload": {"readyPlugins": ["medlab"]}}),
    )
    .await;

    assert!(store.contains_key(&draft_key("medlab")));
}

#[tokio::test]
async fn trigger_enrichment_message() {
    let store = store_with_drafts(&[("medlab", json!({"reportData": {"aiLabSummary": ""}}))]);
    let platform = platform(PlatformConfig::new(), store);

    let response = send(
        &platform,
        json!({"action": "triggerEnrichment", "payload": {"plugins": [{"id": "medlab"}, {"id": "ghost"}]}}),
    )
    .await;

    assert_eq!(
        response,
        json!({"drafts": {"medlab": {"reportData": {"aiLabSummary": "X"}}, "ghost": null}})
    );
}

#[tokio::test]
async fn malformed_messages_have_no_side_effects() {
    let store = store_with_drafts(&[("medlab", json!({"reportData": {"aiLabSummary": ""}}))]);
    let platform = platform(PlatformConfig::new(), store.clone());
    let before = store.peek(&draft_key("medlab"));

    for request in [
        json!("generateAllReports"),
        json!({"action": 7}),
        json!({"action": "deleteEverything", "payload": {}}),
        json!({"action": "generateAllReports", "payload": {"readyPlugins": [1]}}),
        json!({"action": "triggerEnrichment"}),
        json!({"action": "triggerEnrichment", "payload": {"plugins": "medlab"}}),
    ] {
        let response = send(&platform, request.clone()).await;
        assert!(
            response.get("error").and_then(Value::as_str).is_some(),
            "expected error for {request}"
        );
    }

    assert_eq!(store.len(), 1);
    assert_eq!(store.peek(&draft_key("medlab")), before);
    assert!(platform.audit_entries().await.is_empty());
}
