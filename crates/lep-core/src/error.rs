//! Error types for LEP Core
//!
//! Provides error handling for:
//! - Key-value storage access
//! - Draft enrichment faults
//! - Plugin and document-client failures
//! - Summary generation
//! - Message decoding at the UI boundary
//! - Metadata sync and configuration loading
//!
//! Orchestrators never propagate these past a single plugin; they are turned
//! into failure results, log entries or sync statuses.

use std::path::PathBuf;

/// Main platform error type
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    /// Storage backend failed
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Enrichment faulted
    #[error("enrichment error: {0}")]
    Enrichment(#[from] EnrichmentError),

    /// Plugin run faulted
    #[error("plugin error: {0}")]
    Plugin(#[from] PluginError),

    /// Malformed request at the message boundary
    #[error("message error: {0}")]
    Message(#[from] MessageError),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Key-value storage errors
///
/// Always distinct from "key absent", which is `Ok(None)`.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Backend cannot be reached at all
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// IO error on a file-backed store
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Stored or outgoing value could not be (de)serialized
    #[error("serialization error for key '{key}': {source}")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Backend-specific failure
    #[error("backend error for key '{key}': {message}")]
    Backend { key: String, message: String },
}

impl StorageError {
    /// Create backend error for key
    pub fn backend(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Backend {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Create serialization error for key
    pub fn serialization(key: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Serialization {
            key: key.into(),
            source,
        }
    }
}

/// Faults raised by the enrichment engine
#[derive(Debug, thiserror::Error)]
pub enum EnrichmentError {
    /// Stored draft does not have the draft shape
    #[error("malformed draft for plugin '{plugin_id}': {source}")]
    MalformedDraft {
        plugin_id: String,
        #[source]
        source: serde_json::Error,
    },

    /// Enricher-specific failure
    #[error("{0}")]
    Failed(String),
}

/// Plugin run failures
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    /// Document client call failed
    #[error("document client error: {0}")]
    Document(#[from] DocumentError),

    /// Draft unusable for this plugin
    #[error("invalid draft: {0}")]
    InvalidDraft(String),

    /// Plugin-specific failure
    #[error("{0}")]
    Failed(String),
}

/// Document-creation client errors
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// Document id unknown to the client
    #[error("document not found: {0}")]
    NotFound(String),

    /// Authentication could not be obtained
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Remote API rejected the request
    #[error("request failed: {0}")]
    Request(String),
}

/// Summary generation errors
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// Model backend unavailable
    #[error("generator unavailable: {0}")]
    Unavailable(String),

    /// Backend-specific failure
    #[error("generation failed: {0}")]
    Failed(String),
}

/// Malformed requests at the message boundary
#[derive(Debug, thiserror::Error)]
pub enum MessageError {
    /// Request is not a JSON object
    #[error("request must be a JSON object")]
    NotAnObject,

    /// Missing or non-string `action`
    #[error("request is missing a string 'action' field")]
    MissingAction,

    /// Unknown action name
    #[error("unknown action: '{0}'")]
    UnknownAction(String),

    /// Missing `payload` object
    #[error("action '{0}' requires a 'payload' object")]
    MissingPayload(String),

    /// Payload field has the wrong shape
    #[error("invalid payload field '{field}': {reason}")]
    InvalidField { field: String, reason: String },
}

impl MessageError {
    /// Create invalid field error
    pub fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Metadata sync errors
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Endpoint returned a non-success status
    #[error("HTTP error {status}: {body}")]
    Status { status: u16, body: String },

    /// Transport-level failure
    #[error("{0}")]
    Transport(String),
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for this schema
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_error_display() {
        let err = StorageError::backend("pluginDrafts:medlab", "quota exceeded");
        assert_eq!(
            err.to_string(),
            "backend error for key 'pluginDrafts:medlab': quota exceeded"
        );
    }

    #[test]
    fn platform_error_from_storage() {
        let err: PlatformError = StorageError::Unavailable("offline".into()).into();
        assert!(matches!(err, PlatformError::Storage(_)));
        assert!(err.to_string().contains("offline"));
    }

    #[test]
    fn plugin_error_wraps_document_error() {
        let err: PluginError = DocumentError::Auth("no token".into()).into();
        assert_eq!(
            err.to_string(),
            "document client error: authentication failed: no token"
        );
    }

    #[test]
    fn sync_error_status_message() {
        let err = SyncError::Status {
            status: 503,
            body: "down".into(),
        };
        assert_eq!(err.to_string(), "HTTP error 503: down");
    }

    #[test]
    fn message_error_invalid_field() {
        let err = MessageError::invalid_field("readyPlugins", "expected an array");
        assert!(err.to_string().contains("readyPlugins"));
    }
}
