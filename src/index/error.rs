//! Error types for the index module

use thiserror::Error;

use crate::scrape::ScrapeError;

/// Errors that can occur during index operations
#[derive(Debug, Error)]
pub enum IndexError {
    /// Failure from the vector index during a write
    #[error("Index write error: {0}")]
    Write(String),

    /// Failure from the vector index during a read
    #[error("Index query error: {0}")]
    Query(String),

    /// Request shape did not line up (mismatched ids/documents/metadatas)
    #[error("Invalid index request: {0}")]
    InvalidRequest(String),

    /// Failure during URL discovery or content scraping
    #[error("Scrape error: {0}")]
    Scrape(#[from] ScrapeError),
}
