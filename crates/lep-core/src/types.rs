//! Core types for LEP
//!
//! Defines the records the pipeline moves through storage:
//! - Drafts and their report data
//! - Report results produced by plugins
//! - Audit log entries
//! - Metadata sync records and statuses
//!
//! Field names follow the storage layout (camelCase). Unknown fields are kept
//! in flattened maps so records round-trip through the pipeline untouched.

use chrono::{SecondsFormat, Utc};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Name of the summary field inside `reportData`
pub const SUMMARY_FIELD: &str = "aiLabSummary";

/// Provisional input data for a plugin, awaiting report generation
///
/// Object drafts expose `reportData` and keep every other field in `extra`.
/// A stored value that is not an object is carried verbatim in `opaque`;
/// such a draft has no report data and encodes back to the same value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Draft {
    /// Report fields; absent drafts are never enriched
    pub report_data: Option<ReportData>,
    /// Any other top-level draft fields
    pub extra: Map<String, Value>,
    /// Non-object value stored as a draft
    pub opaque: Option<Value>,
}

/// Object shape of a draft on the wire
#[derive(Serialize, Deserialize)]
struct DraftFields<R, E> {
    #[serde(
        rename = "reportData",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    report_data: Option<R>,
    #[serde(flatten)]
    extra: E,
}

impl Serialize for Draft {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.opaque {
            Some(value) => value.serialize(serializer),
            None => DraftFields {
                report_data: self.report_data.as_ref(),
                extra: &self.extra,
            }
            .serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Draft {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        if !value.is_object() {
            return Ok(Self::opaque(value));
        }
        let fields: DraftFields<ReportData, Map<String, Value>> =
            serde_json::from_value(value).map_err(de::Error::custom)?;
        Ok(Self {
            report_data: fields.report_data,
            extra: fields.extra,
            opaque: None,
        })
    }
}

impl Draft {
    /// Create draft with report data
    #[inline]
    #[must_use]
    pub fn new(report_data: ReportData) -> Self {
        Self {
            report_data: Some(report_data),
            ..Self::default()
        }
    }

    /// Draft wrapping a non-object value
    #[inline]
    #[must_use]
    pub fn opaque(value: Value) -> Self {
        Self {
            opaque: Some(value),
            ..Self::default()
        }
    }

    /// Check if this draft is a non-object value
    #[inline]
    #[must_use]
    pub fn is_opaque(&self) -> bool {
        self.opaque.is_some()
    }

    /// Decode a stored value
    ///
    /// # Errors
    /// Fails if an object draft has `reportData` of the wrong shape.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// Encode for storage
    ///
    /// # Errors
    /// Fails only if a flattened field cannot be represented as JSON.
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    /// Current summary, if the draft has report data and a summary
    #[inline]
    #[must_use]
    pub fn summary(&self) -> Option<&str> {
        self.report_data
            .as_ref()
            .and_then(|r| r.ai_lab_summary.as_deref())
    }
}

/// The `reportData` section of a draft
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportData {
    /// AI lab summary; `null` and absent are treated alike
    #[serde(
        rename = "aiLabSummary",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub ai_lab_summary: Option<String>,
    /// All other report fields
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl ReportData {
    /// Create report data with a summary
    #[inline]
    #[must_use]
    pub fn with_summary(summary: impl Into<String>) -> Self {
        Self {
            ai_lab_summary: Some(summary.into()),
            fields: Map::new(),
        }
    }

    /// Add a report field
    #[inline]
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Context handed to the summary generator: every field but the summary
    #[inline]
    #[must_use]
    pub fn generation_context(&self) -> Map<String, Value> {
        self.fields.clone()
    }

    /// Optional `title` field
    #[inline]
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.fields.get("title").and_then(Value::as_str)
    }
}

/// Output of a plugin run, stored at `pluginResults:<id>`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportResult {
    /// Whether the report was produced
    #[serde(default)]
    pub success: bool,
    /// Created document id
    #[serde(rename = "documentId", default)]
    pub document_id: Option<String>,
    /// Created document URL
    #[serde(default)]
    pub url: Option<String>,
    /// Failure description
    #[serde(default)]
    pub error: Option<String>,
    /// Plugin-specific fields (e.g. `title`)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ReportResult {
    /// Successful result pointing at a document
    #[inline]
    #[must_use]
    pub fn succeeded(document_id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            success: true,
            document_id: Some(document_id.into()),
            url: Some(url.into()),
            error: None,
            extra: Map::new(),
        }
    }

    /// Failed result with an error message and no document
    #[inline]
    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            document_id: None,
            url: None,
            error: Some(error.into()),
            extra: Map::new(),
        }
    }

    /// Attach a plugin-specific field
    #[inline]
    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// One per-plugin enrichment outcome in the `reportLogs` sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    pub plugin_id: String,
    /// ISO-8601, UTC, millisecond precision
    pub timestamp: String,
    pub success: bool,
    pub error_message: Option<String>,
}

impl AuditLogEntry {
    /// Entry stamped with the current time
    #[must_use]
    pub fn now(plugin_id: impl Into<String>, success: bool, error_message: Option<String>) -> Self {
        Self {
            plugin_id: plugin_id.into(),
            timestamp: iso_timestamp_now(),
            success,
            error_message,
        }
    }
}

/// Body POSTed to the remote metadata endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataRecord {
    pub document_id: Option<String>,
    pub url: Option<String>,
    pub timestamp: String,
    pub plugin_id: String,
}

/// Per-plugin outcome of a metadata sync
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncStatus {
    pub synced: bool,
    pub message: String,
}

impl SyncStatus {
    #[inline]
    #[must_use]
    pub fn synced(message: impl Into<String>) -> Self {
        Self {
            synced: true,
            message: message.into(),
        }
    }

    #[inline]
    #[must_use]
    pub fn not_synced(message: impl Into<String>) -> Self {
        Self {
            synced: false,
            message: message.into(),
        }
    }
}

/// Current UTC time as `YYYY-MM-DDTHH:MM:SS.mmmZ`
#[must_use]
pub fn iso_timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
