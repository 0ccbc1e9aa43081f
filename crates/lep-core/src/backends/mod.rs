//! Swappable backends behind the pipeline's external interfaces

mod document;
mod summary;

pub use document::{
    ClientFactory, ContentBlock, DocumentClient, InMemoryDocumentClient, StoredDocument,
    TextStyle,
};
pub use summary::{
    PlaceholderSummaryGenerator, SummaryGenerator, ALTERNATIVE_SUMMARY_TEXT,
    PLACEHOLDER_SUMMARY_TEXT,
};
