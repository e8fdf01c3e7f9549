//! Vector index collaborator boundary
//!
//! The vector index is an external, shared resource: embedding generation and
//! distance computation happen on the other side of this trait. Operations
//! are assumed eventually consistent and no transaction spans multiple calls.
//!
//! `MemoryIndex` is a naive in-process implementation used by tests and the
//! CLI; it ranks by term overlap rather than real embeddings.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::index::error::IndexError;
use crate::index::{DocumentMetadata, FilterClause};

/// A batch of documents to add to a collection
#[derive(Debug, Clone)]
pub struct AddItemsRequest {
    /// Unique record identifiers
    pub ids: Vec<String>,

    /// Document text per record
    pub documents: Vec<String>,

    /// Metadata per record
    pub metadatas: Vec<DocumentMetadata>,
}

/// A similarity query against a collection
#[derive(Debug, Clone)]
pub struct QueryRequest {
    /// Query text to rank against
    pub query_text: String,

    /// Maximum number of results
    pub n_results: usize,

    /// Structural metadata filter
    pub filter: Option<FilterClause>,

    /// Optional substring filter over document text
    pub content_filter: Option<String>,
}

/// Ranked query results, parallel-indexed
#[derive(Debug, Clone, Default)]
pub struct QueryResult {
    pub ids: Vec<String>,
    pub documents: Vec<String>,
    pub metadatas: Vec<DocumentMetadata>,
    pub distances: Vec<f32>,
}

/// A direct record lookup by ids or filter
#[derive(Debug, Clone, Default)]
pub struct GetItemsRequest {
    /// Specific record ids to fetch
    pub ids: Option<Vec<String>>,

    /// Structural metadata filter
    pub filter: Option<FilterClause>,

    /// Maximum number of records to return
    pub limit: Option<usize>,

    /// Number of matching records to skip
    pub offset: usize,
}

/// Records returned by a direct lookup, parallel-indexed
#[derive(Debug, Clone, Default)]
pub struct GetItemsResult {
    pub ids: Vec<String>,
    pub documents: Vec<String>,
    pub metadatas: Vec<DocumentMetadata>,
}

/// Abstract contract for the vector index collaborator
pub trait VectorIndex {
    /// Add a batch of records to a collection
    fn add_items(
        &self,
        collection: &str,
        request: AddItemsRequest,
    ) -> impl std::future::Future<Output = Result<(), IndexError>> + Send;

    /// Run a similarity query against a collection
    fn query_items(
        &self,
        collection: &str,
        request: QueryRequest,
    ) -> impl std::future::Future<Output = Result<QueryResult, IndexError>> + Send;

    /// Fetch records directly by id or filter
    fn get_items(
        &self,
        collection: &str,
        request: GetItemsRequest,
    ) -> impl std::future::Future<Output = Result<GetItemsResult, IndexError>> + Send;

    /// Delete records by id or filter; returns the number removed
    fn delete_items(
        &self,
        collection: &str,
        ids: Option<Vec<String>>,
        filter: Option<FilterClause>,
    ) -> impl std::future::Future<Output = Result<usize, IndexError>> + Send;

    /// Count the records in a collection
    fn count_items(
        &self,
        collection: &str,
    ) -> impl std::future::Future<Output = Result<usize, IndexError>> + Send;
}

#[derive(Debug, Clone)]
struct StoredItem {
    id: String,
    document: String,
    metadata: DocumentMetadata,
}

/// In-memory vector index used by tests and the CLI
#[derive(Debug, Clone, Default)]
pub struct MemoryIndex {
    collections: Arc<RwLock<HashMap<String, Vec<StoredItem>>>>,
}

impl MemoryIndex {
    /// Create a new, empty index
    pub fn new() -> Self {
        Self::default()
    }
}

/// Naive relevance: fraction of query terms present in the candidate text
fn overlap_distance(query: &str, text: &str) -> f32 {
    let text = text.to_lowercase();
    let terms: Vec<&str> = query.split_whitespace().collect();
    if terms.is_empty() {
        return 1.0;
    }
    let hits = terms
        .iter()
        .filter(|term| text.contains(&term.to_lowercase()))
        .count();
    1.0 - (hits as f32 / terms.len() as f32)
}

impl VectorIndex for MemoryIndex {
    async fn add_items(
        &self,
        collection: &str,
        request: AddItemsRequest,
    ) -> Result<(), IndexError> {
        if request.ids.len() != request.documents.len()
            || request.ids.len() != request.metadatas.len()
        {
            return Err(IndexError::InvalidRequest(format!(
                "mismatched batch lengths: {} ids, {} documents, {} metadatas",
                request.ids.len(),
                request.documents.len(),
                request.metadatas.len()
            )));
        }

        let mut collections = self.collections.write().await;
        let items = collections.entry(collection.to_string()).or_default();
        for ((id, document), metadata) in request
            .ids
            .into_iter()
            .zip(request.documents)
            .zip(request.metadatas)
        {
            items.push(StoredItem {
                id,
                document,
                metadata,
            });
        }

        debug!("Collection '{}' now holds {} items", collection, items.len());
        Ok(())
    }

    async fn query_items(
        &self,
        collection: &str,
        request: QueryRequest,
    ) -> Result<QueryResult, IndexError> {
        let collections = self.collections.read().await;
        let items = collections.get(collection).map(Vec::as_slice).unwrap_or(&[]);

        let mut scored: Vec<(&StoredItem, f32)> = items
            .iter()
            .filter(|item| {
                request
                    .filter
                    .as_ref()
                    .is_none_or(|clause| clause.matches(&item.metadata))
            })
            .filter(|item| {
                request.content_filter.as_ref().is_none_or(|needle| {
                    item.document
                        .to_lowercase()
                        .contains(&needle.to_lowercase())
                })
            })
            .map(|item| {
                let haystack = format!("{} {}", item.document, item.metadata.searchable_text);
                (item, overlap_distance(&request.query_text, &haystack))
            })
            .collect();

        scored.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(request.n_results);

        let mut result = QueryResult::default();
        for (item, distance) in scored {
            result.ids.push(item.id.clone());
            result.documents.push(item.document.clone());
            result.metadatas.push(item.metadata.clone());
            result.distances.push(distance);
        }
        Ok(result)
    }

    async fn get_items(
        &self,
        collection: &str,
        request: GetItemsRequest,
    ) -> Result<GetItemsResult, IndexError> {
        let collections = self.collections.read().await;
        let items = collections.get(collection).map(Vec::as_slice).unwrap_or(&[]);

        let matching = items
            .iter()
            .filter(|item| {
                request
                    .ids
                    .as_ref()
                    .is_none_or(|ids| ids.contains(&item.id))
            })
            .filter(|item| {
                request
                    .filter
                    .as_ref()
                    .is_none_or(|clause| clause.matches(&item.metadata))
            })
            .skip(request.offset)
            .take(request.limit.unwrap_or(usize::MAX));

        let mut result = GetItemsResult::default();
        for item in matching {
            result.ids.push(item.id.clone());
            result.documents.push(item.document.clone());
            result.metadatas.push(item.metadata.clone());
        }
        Ok(result)
    }

    async fn delete_items(
        &self,
        collection: &str,
        ids: Option<Vec<String>>,
        filter: Option<FilterClause>,
    ) -> Result<usize, IndexError> {
        let mut collections = self.collections.write().await;
        let Some(items) = collections.get_mut(collection) else {
            return Ok(0);
        };

        let before = items.len();
        items.retain(|item| {
            let id_match = ids.as_ref().is_none_or(|ids| ids.contains(&item.id));
            let filter_match = filter
                .as_ref()
                .is_none_or(|clause| clause.matches(&item.metadata));
            !(id_match && filter_match)
        });
        Ok(before - items.len())
    }

    async fn count_items(&self, collection: &str) -> Result<usize, IndexError> {
        let collections = self.collections.read().await;
        Ok(collections.get(collection).map(Vec::len).unwrap_or(0))
    }
}
