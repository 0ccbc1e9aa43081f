//! MedLab AI Report plugin
//!
//! Renders a draft's report data into a new document: a title heading, one
//! line per report field, then the AI lab summary section.

use crate::backends::{ContentBlock, DocumentClient};
use crate::error::PluginError;
use crate::registry::{PluginDescriptor, ReportPlugin};
use crate::types::{Draft, ReportResult};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;

/// Registry id
pub const ID: &str = "medlab";

/// Display name
pub const NAME: &str = "MedLab AI Report";

/// Registry descriptor for this plugin
#[must_use]
pub fn descriptor() -> PluginDescriptor {
    PluginDescriptor::new(ID, NAME, Arc::new(MedLabReport))
        .with_description("Generates medical lab summary reports.")
}

/// The MedLab report generator
#[derive(Debug, Clone, Copy, Default)]
pub struct MedLabReport;

impl MedLabReport {
    fn blocks(title: &str, draft: &Draft) -> Vec<ContentBlock> {
        let mut blocks = vec![ContentBlock::heading(format!("{title}\n"), 18)];
        let Some(data) = draft.report_data.as_ref() else {
            return blocks;
        };

        for (key, value) in data.fields.iter().filter(|(k, _)| k.as_str() != "title") {
            let rendered = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            blocks.push(ContentBlock::plain(format!("{key}: {rendered}\n")));
        }

        if let Some(summary) = data.ai_lab_summary.as_deref() {
            blocks.push(ContentBlock::heading("AI Lab Summary\n", 14));
            blocks.push(ContentBlock::plain(format!("{summary}\n")));
        }
        blocks
    }
}

#[async_trait]
impl ReportPlugin for MedLabReport {
    async fn run(
        &self,
        draft: &Draft,
        client: &dyn DocumentClient,
    ) -> Result<ReportResult, PluginError> {
        let Some(data) = draft.report_data.as_ref() else {
            return Ok(ReportResult::failed("Draft has no reportData"));
        };

        let title = data.title().map_or_else(
            || format!("{NAME} - {}", Utc::now().format("%Y-%m-%d")),
            str::to_string,
        );

        let document_id = client.create_document(&title).await?;
        client
            .append_blocks(&document_id, &Self::blocks(&title, draft))
            .await?;

        tracing::info!(plugin_id = ID, document_id = %document_id, "MedLab report created");

        let url = client.document_url(&document_id);
        Ok(ReportResult::succeeded(document_id, url).with_extra("title", title))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::InMemoryDocumentClient;
    use crate::types::ReportData;
    use serde_json::json;

    #[tokio::test]
    async fn renders_report_document() {
        let client = InMemoryDocumentClient::new();
        let draft = Draft::new(
            ReportData::with_summary("All values nominal.")
                .with_field("title", "Panel A")
                .with_field("hemoglobin", 13.5),
        );

        let result = MedLabReport.run(&draft, &client).await.unwrap();
        assert!(result.success);
        assert_eq!(result.extra.get("title"), Some(&json!("Panel A")));

        let id = result.document_id.unwrap();
        assert_eq!(result.url.unwrap(), client.document_url(&id));

        let doc = client.document(&id).unwrap();
        assert_eq!(doc.title, "Panel A");
        let text = doc.text();
        assert!(text.starts_with("Panel A\n"));
        assert!(text.contains("hemoglobin: 13.5\n"));
        assert!(text.ends_with("AI Lab Summary\nAll values nominal.\n"));
    }

    #[tokio::test]
    async fn default_title_is_dated() {
        let client = InMemoryDocumentClient::new();
        let draft = Draft::new(ReportData::with_summary("s"));
        let result = MedLabReport.run(&draft, &client).await.unwrap();

        let title = result.extra.get("title").and_then(Value::as_str).unwrap();
        assert!(title.starts_with("MedLab AI Report - "));
    }

    #[tokio::test]
    async fn missing_report_data_is_failed_result() {
        let client = InMemoryDocumentClient::new();
        let result = MedLabReport.run(&Draft::default(), &client).await.unwrap();
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("Draft has no reportData"));
        assert!(client.is_empty());
    }
}
