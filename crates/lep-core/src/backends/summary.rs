//! Summary generation capability
//!
//! The enrichment engine asks a [`SummaryGenerator`] for a replacement
//! `aiLabSummary`. Real model integration lives outside this crate; the
//! bundled [`PlaceholderSummaryGenerator`] returns fixed prose.

use crate::error::GenerationError;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::time::Duration;

/// Fixed text returned by the placeholder generator
pub const PLACEHOLDER_SUMMARY_TEXT: &str = "This is a placeholder AI-generated summary. \
Based on the provided data, key observations include [observation 1], \
[observation 2], and [recommendation 1]. \
Further details should be elaborated by the actual AI model.";

/// Fixed text returned by the alternative placeholder generator
pub const ALTERNATIVE_SUMMARY_TEXT: &str =
    "This is a placeholder summary from an alternative AI model.";

/// Produces a summary from report context
///
/// `Ok(None)` means the backend produced no content.
#[async_trait]
pub trait SummaryGenerator: Send + Sync {
    /// Generate a summary from every report field except the summary itself
    async fn generate(&self, context: &Map<String, Value>) -> Result<Option<String>, GenerationError>;
}

/// Generator returning fixed text after a simulated delay
#[derive(Debug, Clone)]
pub struct PlaceholderSummaryGenerator {
    text: String,
    delay: Duration,
}

impl PlaceholderSummaryGenerator {
    /// Primary placeholder model
    #[inline]
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            text: PLACEHOLDER_SUMMARY_TEXT.to_string(),
            delay,
        }
    }

    /// Alternative placeholder model
    #[inline]
    #[must_use]
    pub fn alternative(delay: Duration) -> Self {
        Self {
            text: ALTERNATIVE_SUMMARY_TEXT.to_string(),
            delay,
        }
    }

    /// Text this generator returns
    #[inline]
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl Default for PlaceholderSummaryGenerator {
    fn default() -> Self {
        Self::new(Duration::ZERO)
    }
}

#[async_trait]
impl SummaryGenerator for PlaceholderSummaryGenerator {
    async fn generate(&self, context: &Map<String, Value>) -> Result<Option<String>, GenerationError> {
        tracing::debug!(fields = context.len(), "Generating placeholder summary");
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(Some(self.text.clone()))
    }
}
