//! # Documentation Search Module
//!
//! This module provides the retrieval surface over the vector index, turning
//! raw similarity queries into typed, filtered documentation results.
//!
//! ## Key Components
//!
//! - `SearchSystem`: Main interface for querying a collection
//! - `SearchOptions`: Configuration for filtering and limiting results
//! - `SearchResult`: A retrieved document with its metadata and score
//!
//! ## Search Process
//!
//! 1. Validate the query and options
//! 2. Build the structural filter, always pinned to a document kind
//! 3. Run the similarity query against the vector index
//! 4. Convert distances to relevance scores and shape the results

mod error;
mod search_impl;

pub use error::SearchError;
pub use search_impl::{
    list_documents, search_by_keywords, search_documents, SearchOptions, SearchResult,
};

use crate::index::{GetItemsResult, VectorIndex};

/// Search system bound to one collection of a vector index
pub struct SearchSystem<I: VectorIndex> {
    index: I,
    collection: String,
}

impl<I: VectorIndex> SearchSystem<I> {
    /// Create a new search system over the given index and collection
    pub fn new(index: I, collection: impl Into<String>) -> Self {
        Self {
            index,
            collection: collection.into(),
        }
    }

    /// Search documents with the given query and options
    pub async fn search(
        &self,
        query: &str,
        options: SearchOptions,
    ) -> Result<Vec<SearchResult>, SearchError> {
        search_documents(&self.index, &self.collection, query, options).await
    }

    /// Search documents by keyword set
    pub async fn search_keywords(
        &self,
        keywords: &[String],
        limit: usize,
    ) -> Result<Vec<SearchResult>, SearchError> {
        search_by_keywords(&self.index, &self.collection, keywords, limit).await
    }

    /// List indexed documents without ranking
    pub async fn list(&self, options: SearchOptions) -> Result<GetItemsResult, SearchError> {
        list_documents(&self.index, &self.collection, options).await
    }

    /// Get the underlying index reference
    pub fn index(&self) -> &I {
        &self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_options_default() {
        let options = SearchOptions::default();
        assert_eq!(options.limit, 10);
        assert!(options.filters.library_name.is_none());
        assert!(options.filters.version.is_none());
        assert!(options.filters.category.is_none());
        assert_eq!(options.offset, 0);
    }
}
