//! Search implementation over the vector index
//!
//! All entry points validate their parameters, build the structural filter
//! through the shared filter builder, and shape raw index results into
//! `SearchResult` values with a 0..=1 relevance score.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::index::{
    build_document_filter, build_keyword_filter, DocKind, GetItemsRequest, GetItemsResult,
    QueryRequest, SearchFilters, VectorIndex,
};
use crate::search::SearchError;

/// Maximum snippet length in a search result
const MAX_SNIPPET_LENGTH: usize = 300;

/// Options for a documentation search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchOptions {
    /// Maximum number of results to return
    pub limit: usize,

    /// Number of matching records to skip, used by listing
    pub offset: usize,

    /// Metadata filters to apply
    pub filters: SearchFilters,

    /// Which document kind the search is scoped to
    pub kind: DocKind,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            limit: 10,
            offset: 0,
            filters: SearchFilters::default(),
            kind: DocKind::UrlDocument,
        }
    }
}

/// A single search result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// Record identifier in the index
    pub id: String,

    /// Source URL of the document
    pub url: String,

    /// Document title
    pub title: String,

    /// Short description, possibly empty
    pub description: String,

    /// Section derived from the URL path
    pub section: String,

    /// Library the documentation belongs to
    pub library_name: String,

    /// Library version
    pub version: String,

    /// Category the document was indexed under
    pub category: String,

    /// Keyword set of the document
    pub keywords: Vec<String>,

    /// Relevance score in 0..=1, higher is better
    pub score: f32,

    /// Leading excerpt of the document text
    pub snippet: String,
}

/// Truncate document text to a result snippet on a char boundary
fn snippet_of(document: &str) -> String {
    if document.chars().count() <= MAX_SNIPPET_LENGTH {
        return document.to_string();
    }
    let truncated: String = document.chars().take(MAX_SNIPPET_LENGTH).collect();
    format!("{}...", truncated.trim_end())
}

fn validate_limit(limit: usize) -> Result<(), SearchError> {
    if limit == 0 {
        return Err(SearchError::InvalidParameters(
            "limit must be greater than zero".to_string(),
        ));
    }
    Ok(())
}

/// Search documents by free-text query
///
/// The structural filter always pins the document kind; the caller's library,
/// version, and category filters narrow it further.
#[instrument(skip(index))]
pub async fn search_documents<I: VectorIndex>(
    index: &I,
    collection: &str,
    query: &str,
    options: SearchOptions,
) -> Result<Vec<SearchResult>, SearchError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(SearchError::InvalidParameters(
            "query must not be empty".to_string(),
        ));
    }
    validate_limit(options.limit)?;

    let filter = build_document_filter(options.kind, &options.filters);
    let result = index
        .query_items(
            collection,
            QueryRequest {
                query_text: query.to_lowercase(),
                n_results: options.limit,
                filter: Some(filter),
                content_filter: None,
            },
        )
        .await?;

    debug!("Query '{}' matched {} documents", query, result.ids.len());
    Ok(shape_results(result))
}

/// Search documents by keyword set
///
/// Keywords are lower-cased and joined into one query string; structural
/// filtering only pins the document kind.
#[instrument(skip(index))]
pub async fn search_by_keywords<I: VectorIndex>(
    index: &I,
    collection: &str,
    keywords: &[String],
    limit: usize,
) -> Result<Vec<SearchResult>, SearchError> {
    if keywords.iter().all(|k| k.trim().is_empty()) {
        return Err(SearchError::InvalidParameters(
            "at least one keyword is required".to_string(),
        ));
    }
    validate_limit(limit)?;

    let query_text = keywords
        .iter()
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    let result = index
        .query_items(
            collection,
            QueryRequest {
                query_text,
                n_results: limit,
                filter: Some(build_keyword_filter(DocKind::UrlDocument)),
                content_filter: None,
            },
        )
        .await?;

    Ok(shape_results(result))
}

/// List indexed documents without similarity ranking
///
/// Returns records in insertion order, honoring the options' filters, limit,
/// and offset.
#[instrument(skip(index))]
pub async fn list_documents<I: VectorIndex>(
    index: &I,
    collection: &str,
    options: SearchOptions,
) -> Result<GetItemsResult, SearchError> {
    validate_limit(options.limit)?;

    let filter = build_document_filter(options.kind, &options.filters);
    let result = index
        .get_items(
            collection,
            GetItemsRequest {
                ids: None,
                filter: Some(filter),
                limit: Some(options.limit),
                offset: options.offset,
            },
        )
        .await?;
    Ok(result)
}

fn shape_results(result: crate::index::QueryResult) -> Vec<SearchResult> {
    result
        .ids
        .into_iter()
        .zip(result.documents)
        .zip(result.metadatas)
        .zip(result.distances)
        .map(|(((id, document), metadata), distance)| SearchResult {
            id,
            url: metadata.url,
            title: metadata.title,
            description: metadata.description,
            section: metadata.section,
            library_name: metadata.library_name,
            version: metadata.version,
            category: metadata.category,
            keywords: metadata.keywords,
            score: (1.0 - distance).clamp(0.0, 1.0),
            snippet: snippet_of(&document),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{
        build_searchable_text, AddItemsRequest, DocumentMetadata, MemoryIndex,
    };
    use chrono::Utc;

    fn metadata(library: &str, version: &str, kind: DocKind) -> DocumentMetadata {
        let keywords = vec![library.to_string(), "guide".to_string()];
        DocumentMetadata {
            url: format!("https://example.com/docs/{}", library),
            title: format!("{} guide", library),
            library_name: library.to_string(),
            version: version.to_string(),
            category: "documentation".to_string(),
            searchable_text: build_searchable_text(
                library,
                version,
                "documentation",
                &keywords,
                "guide",
            ),
            keywords,
            description: format!("all about {}", library),
            section: library.to_string(),
            last_updated: Utc::now(),
            doc_type: kind,
            content_extracted: false,
            added_at: Utc::now(),
        }
    }

    async fn seeded_index() -> MemoryIndex {
        let index = MemoryIndex::new();
        index
            .add_items(
                "documentation",
                AddItemsRequest {
                    ids: vec!["1".to_string(), "2".to_string(), "3".to_string()],
                    documents: vec![
                        "tokio async runtime and tasks".to_string(),
                        "react hooks and state".to_string(),
                        "legacy tokio note".to_string(),
                    ],
                    metadatas: vec![
                        metadata("tokio", "1.0", DocKind::UrlDocument),
                        metadata("react", "18.2", DocKind::UrlDocument),
                        metadata("tokio", "0.2", DocKind::Document),
                    ],
                },
            )
            .await
            .unwrap();
        index
    }

    #[tokio::test]
    async fn test_search_scopes_to_url_documents() {
        let index = seeded_index().await;
        let results = search_documents(&index, "documentation", "tokio", SearchOptions::default())
            .await
            .unwrap();

        assert!(!results.is_empty());
        assert!(results.iter().all(|r| r.version != "0.2"));
        let top = &results[0];
        assert_eq!(top.library_name, "tokio");
        assert!(top.score > 0.5);
        assert!(top.snippet.contains("async runtime"));
    }

    #[tokio::test]
    async fn test_search_with_library_filter() {
        let index = seeded_index().await;
        let options = SearchOptions {
            filters: SearchFilters {
                library_name: Some("React".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        let results = search_documents(&index, "documentation", "guide", options)
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].library_name, "react");
    }

    #[tokio::test]
    async fn test_empty_query_rejected() {
        let index = MemoryIndex::new();
        let result =
            search_documents(&index, "documentation", "   ", SearchOptions::default()).await;
        assert!(matches!(result, Err(SearchError::InvalidParameters(_))));
    }

    #[tokio::test]
    async fn test_zero_limit_rejected() {
        let index = MemoryIndex::new();
        let options = SearchOptions {
            limit: 0,
            ..Default::default()
        };
        let result = search_documents(&index, "documentation", "tokio", options).await;
        assert!(matches!(result, Err(SearchError::InvalidParameters(_))));
    }

    #[tokio::test]
    async fn test_keyword_search() {
        let index = seeded_index().await;
        let keywords = vec!["React".to_string(), "HOOKS".to_string()];
        let results = search_by_keywords(&index, "documentation", &keywords, 5)
            .await
            .unwrap();

        assert_eq!(results[0].library_name, "react");
    }

    #[tokio::test]
    async fn test_keyword_search_requires_keywords() {
        let index = MemoryIndex::new();
        let keywords = vec!["  ".to_string()];
        let result = search_by_keywords(&index, "documentation", &keywords, 5).await;
        assert!(matches!(result, Err(SearchError::InvalidParameters(_))));
    }

    #[tokio::test]
    async fn test_list_documents_pagination() {
        let index = seeded_index().await;
        let options = SearchOptions {
            limit: 1,
            offset: 1,
            ..Default::default()
        };
        let listed = list_documents(&index, "documentation", options)
            .await
            .unwrap();

        // Only url-documents are listed, so offset 1 lands on the second one
        assert_eq!(listed.ids, vec!["2".to_string()]);
    }

    #[test]
    fn test_snippet_truncation() {
        let long = "word ".repeat(200);
        let snippet = snippet_of(&long);
        assert!(snippet.ends_with("..."));
        assert!(snippet.chars().count() <= MAX_SNIPPET_LENGTH + 3);

        let short = "short document";
        assert_eq!(snippet_of(short), short);
    }
}
