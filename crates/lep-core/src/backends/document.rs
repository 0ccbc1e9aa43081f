//! Document-creation client
//!
//! Plugins receive a [`DocumentClient`] and use it to create their report
//! documents. The orchestrator builds one client per batch through a
//! [`ClientFactory`], so plugins share any session state the client holds.

use crate::error::DocumentError;
use async_trait::async_trait;
use indexmap::IndexMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use ulid::Ulid;

/// Builds the per-batch document client
pub type ClientFactory = Arc<dyn Fn() -> Arc<dyn DocumentClient> + Send + Sync>;

/// Text styling for a content block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyle {
    pub bold: bool,
    /// Point size
    pub font_size: Option<u32>,
}

/// A run of text appended to a document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentBlock {
    pub text: String,
    pub style: Option<TextStyle>,
}

impl ContentBlock {
    /// Unstyled block
    #[inline]
    #[must_use]
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: None,
        }
    }

    /// Bold block at the given point size
    #[inline]
    #[must_use]
    pub fn heading(text: impl Into<String>, font_size: u32) -> Self {
        Self {
            text: text.into(),
            style: Some(TextStyle {
                bold: true,
                font_size: Some(font_size),
            }),
        }
    }
}

/// Client for a document service
#[async_trait]
pub trait DocumentClient: Send + Sync {
    /// Create an empty document, returning its id
    async fn create_document(&self, title: &str) -> Result<String, DocumentError>;

    /// Append blocks to the end of a document
    async fn append_blocks(
        &self,
        document_id: &str,
        blocks: &[ContentBlock],
    ) -> Result<(), DocumentError>;

    /// Browser URL of a document
    fn document_url(&self, document_id: &str) -> String;
}

/// Document held by [`InMemoryDocumentClient`]
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub title: String,
    pub blocks: Vec<ContentBlock>,
}

impl StoredDocument {
    /// Concatenated text of all blocks
    #[must_use]
    pub fn text(&self) -> String {
        self.blocks.iter().map(|b| b.text.as_str()).collect()
    }
}

/// Process-local document client
#[derive(Debug, Default)]
pub struct InMemoryDocumentClient {
    documents: Mutex<IndexMap<String, StoredDocument>>,
}

impl InMemoryDocumentClient {
    /// Create client with no documents
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Factory producing a fresh client per batch
    #[must_use]
    pub fn factory() -> ClientFactory {
        Arc::new(|| Arc::new(Self::new()) as Arc<dyn DocumentClient>)
    }

    /// Document by id
    #[must_use]
    pub fn document(&self, document_id: &str) -> Option<StoredDocument> {
        self.documents.lock().get(document_id).cloned()
    }

    /// Number of documents created
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.lock().len()
    }

    /// Check if no documents were created
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.lock().is_empty()
    }
}

#[async_trait]
impl DocumentClient for InMemoryDocumentClient {
    async fn create_document(&self, title: &str) -> Result<String, DocumentError> {
        let id = Ulid::new().to_string();
        self.documents.lock().insert(
            id.clone(),
            StoredDocument {
                title: title.to_string(),
                blocks: Vec::new(),
            },
        );
        tracing::debug!(document_id = %id, title, "Created document");
        Ok(id)
    }

    async fn append_blocks(
        &self,
        document_id: &str,
        blocks: &[ContentBlock],
    ) -> Result<(), DocumentError> {
        let mut documents = self.documents.lock();
        let document = documents
            .get_mut(document_id)
            .ok_or_else(|| DocumentError::NotFound(document_id.to_string()))?;
        document.blocks.extend_from_slice(blocks);
        Ok(())
    }

    fn document_url(&self, document_id: &str) -> String {
        format!("https://docs.google.com/document/d/{document_id}/edit")
    }
}
