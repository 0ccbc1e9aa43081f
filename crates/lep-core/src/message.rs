//! UI message boundary
//!
//! Request shapes accepted from the popup:
//!
//! ```json
//! {"action": "generateAllReports", "payload": {"readyPlugins": ["medlab"], "debugMode": false}}
//! {"action": "triggerEnrichment", "payload": {"plugins": [{"id": "medlab"}]}}
//! ```
//!
//! Responses are `{"results": {...}}`, `{"drafts": {...}}` or
//! `{"error": "..."}`. Decoding happens before any side effect, so a
//! rejected request touches nothing.

use crate::batch::EnrichmentOutcomes;
use crate::error::MessageError;
use crate::reports::ReportResults;
use serde::Serialize;
use serde_json::{Map, Value};

/// Action name for report generation
pub const GENERATE_ALL_REPORTS: &str = "generateAllReports";

/// Action name for batch enrichment
pub const TRIGGER_ENRICHMENT: &str = "triggerEnrichment";

/// Decoded request
#[derive(Debug, Clone, PartialEq)]
pub enum BackgroundRequest {
    /// Run report plugins
    GenerateAllReports {
        ready_plugins: Vec<String>,
        /// `None` falls back to the configured debug mode
        debug_mode: Option<bool>,
    },
    /// Enrich drafts; entries are validated per plugin by the batch
    TriggerEnrichment { plugins: Vec<Value> },
}

impl BackgroundRequest {
    /// Decode and validate a raw request
    ///
    /// # Errors
    /// Returns `MessageError` describing the first problem found.
    pub fn parse(request: &Value) -> Result<Self, MessageError> {
        let object = request.as_object().ok_or(MessageError::NotAnObject)?;
        let action = object
            .get("action")
            .and_then(Value::as_str)
            .ok_or(MessageError::MissingAction)?;

        match action {
            GENERATE_ALL_REPORTS => {
                let payload = payload(object, action)?;
                Ok(Self::GenerateAllReports {
                    ready_plugins: ready_plugins(payload)?,
                    debug_mode: debug_mode(payload)?,
                })
            }
            TRIGGER_ENRICHMENT => {
                let payload = payload(object, action)?;
                let plugins = payload
                    .get("plugins")
                    .and_then(Value::as_array)
                    .ok_or_else(|| MessageError::invalid_field("plugins", "expected an array"))?;
                Ok(Self::TriggerEnrichment {
                    plugins: plugins.clone(),
                })
            }
            other => Err(MessageError::UnknownAction(other.to_string())),
        }
    }
}

fn payload<'a>(object: &'a Map<String, Value>, action: &str) -> Result<&'a Map<String, Value>, MessageError> {
    object
        .get("payload")
        .and_then(Value::as_object)
        .ok_or_else(|| MessageError::MissingPayload(action.to_string()))
}

fn ready_plugins(payload: &Map<String, Value>) -> Result<Vec<String>, MessageError> {
    let entries = payload
        .get("readyPlugins")
        .and_then(Value::as_array)
        .ok_or_else(|| MessageError::invalid_field("readyPlugins", "expected an array of plugin ids"))?;

    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            entry.as_str().map(str::to_string).ok_or_else(|| {
                MessageError::invalid_field("readyPlugins", format!("entry {i} is not a string"))
            })
        })
        .collect()
}

fn debug_mode(payload: &Map<String, Value>) -> Result<Option<bool>, MessageError> {
    match payload.get("debugMode") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(flag)) => Ok(Some(*flag)),
        Some(_) => Err(MessageError::invalid_field("debugMode", "expected a boolean")),
    }
}

/// Encoded response
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BackgroundResponse {
    /// Report results per plugin
    Results { results: ReportResults },
    /// Enrichment outcomes per plugin
    Drafts { drafts: EnrichmentOutcomes },
    /// Request rejected
    Error { error: String },
}

impl BackgroundResponse {
    /// Error response
    #[inline]
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            error: message.into(),
        }
    }

    /// Check if this is an error response
    #[inline]
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}

impl From<MessageError> for BackgroundResponse {
    fn from(err: MessageError) -> Self {
        Self::error(err.to_string())
    }
}
