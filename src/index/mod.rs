//! Index module for documentation records
//!
//! This module provides the per-document metadata model, the vector index
//! collaborator boundary, filter-clause construction, and the bulk indexing
//! orchestrator.

mod bulk;
pub mod error;
mod filter;
mod store;

pub use bulk::{
    derive_keywords, derive_section, BulkIndexConfig, BulkIndexReport, BulkIndexRequest,
    BulkIndexer, DegradedReason, FailedUrl,
};
pub use error::IndexError;
pub use filter::{
    build_document_filter, build_keyword_filter, FieldCondition, FilterClause, SearchFilters,
};
pub use store::{
    AddItemsRequest, GetItemsRequest, GetItemsResult, MemoryIndex, QueryRequest, QueryResult,
    VectorIndex,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default collection name for documentation records
pub const DEFAULT_COLLECTION: &str = "documentation";

/// Discriminator separating URL-derived documents from free-text legacy
/// documents stored in the same index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocKind {
    /// A document ingested from a discovered URL
    #[serde(rename = "url-document")]
    UrlDocument,

    /// A legacy free-text document
    #[serde(rename = "document")]
    Document,
}

impl DocKind {
    /// The stored string form of the discriminator
    pub fn as_str(&self) -> &'static str {
        match self {
            DocKind::UrlDocument => "url-document",
            DocKind::Document => "document",
        }
    }
}

/// Metadata written alongside each indexed document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Source URL of the document
    pub url: String,

    /// Document title
    pub title: String,

    /// Library the documentation belongs to, lower-cased
    pub library_name: String,

    /// Library version
    pub version: String,

    /// Category, lower-cased
    pub category: String,

    /// Ordered, deduplicated keyword set
    pub keywords: Vec<String>,

    /// Short description of the document
    pub description: String,

    /// Section derived from the URL path
    pub section: String,

    /// Last update timestamp
    pub last_updated: DateTime<Utc>,

    /// Document-kind discriminator; leads every filtered query
    pub doc_type: DocKind,

    /// Whether full page content was extracted for this record
    pub content_extracted: bool,

    /// When the record was added to the index
    pub added_at: DateTime<Utc>,

    /// Lower-cased concatenation of library, version, category, keywords,
    /// and title for naive text matching
    pub searchable_text: String,
}

/// Build the lower-cased searchable text for a document
pub fn build_searchable_text(
    library_name: &str,
    version: &str,
    category: &str,
    keywords: &[String],
    title: &str,
) -> String {
    let mut parts = vec![
        library_name.to_string(),
        version.to_string(),
        category.to_string(),
    ];
    parts.extend(keywords.iter().cloned());
    parts.push(title.to_string());
    parts.join(" ").to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doc_kind_serialization() {
        assert_eq!(
            serde_json::to_string(&DocKind::UrlDocument).unwrap(),
            "\"url-document\""
        );
        assert_eq!(
            serde_json::to_string(&DocKind::Document).unwrap(),
            "\"document\""
        );
        assert_eq!(DocKind::UrlDocument.as_str(), "url-document");
    }

    #[test]
    fn test_build_searchable_text() {
        let keywords = vec!["react".to_string(), "hooks".to_string()];
        let text = build_searchable_text("React", "18.2", "Frontend", &keywords, "Using Hooks");
        assert_eq!(text, "react 18.2 frontend react hooks using hooks");
    }
}
