//! Error types for the scrape module

use thiserror::Error;

/// Error type for scraping operations
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Malformed URL or disallowed scheme; never retried
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl {
        /// The offending URL as supplied by the caller
        url: String,
        /// Why it was rejected
        reason: String,
    },

    /// Network, timeout, or size-cap failure during a single page fetch
    #[error("Failed to fetch '{url}': {cause}")]
    Fetch {
        /// The URL that failed to fetch
        url: String,
        /// Underlying cause text
        cause: String,
    },

    /// HTML parsing error
    #[error("HTML parsing error: {0}")]
    HtmlParse(String),

    /// URL parsing error
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl ScrapeError {
    /// Build an `InvalidUrl` error
    pub fn invalid_url(url: impl Into<String>, reason: impl Into<String>) -> Self {
        ScrapeError::InvalidUrl {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Build a `Fetch` error identifying the offending URL
    pub fn fetch(url: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        ScrapeError::Fetch {
            url: url.into(),
            cause: cause.to_string(),
        }
    }
}
