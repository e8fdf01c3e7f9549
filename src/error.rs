//! Error types for the docdex crate

use thiserror::Error;

/// Result type for docdex operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for docdex operations
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Scraping error
    #[error("Scrape error: {0}")]
    Scrape(#[from] crate::scrape::ScrapeError),

    /// Index error
    #[error("Index error: {0}")]
    Index(#[from] crate::index::IndexError),

    /// Search error
    #[error("Search error: {0}")]
    Search(#[from] crate::search::SearchError),

    /// Key-value store error
    #[error("Store error: {0}")]
    Store(#[from] crate::kv::KvError),

    /// Invalid request parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}
