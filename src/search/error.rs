//! # Search Error Types Module
//!
//! Error types for the search surface. Failures are split by where in the
//! pipeline they happen so callers can tell a bad request from a broken
//! index connection.

use thiserror::Error;

use crate::index::IndexError;

/// Errors that can occur during search operations
#[derive(Debug, Error)]
pub enum SearchError {
    /// Error from the underlying vector index
    #[error("Index error: {0}")]
    Index(#[from] IndexError),

    /// Error occurred while shaping results
    #[error("Result processing error: {0}")]
    ResultProcessing(String),

    /// Invalid search parameters
    #[error("Invalid search parameters: {0}")]
    InvalidParameters(String),
}

impl From<serde_json::Error> for SearchError {
    fn from(err: serde_json::Error) -> Self {
        SearchError::ResultProcessing(err.to_string())
    }
}
