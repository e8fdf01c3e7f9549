//! # Web Scraping Module
//!
//! This module provides functionality for fetching single web pages, cleaning
//! their content, and discovering hyperlinks. It is the first stage of the
//! documentation indexing workflow, responsible for gathering raw material.
//!
//! ## Key Components
//!
//! - `ScrapeConfig`: Configuration for fetching (timeout, byte cap, headers)
//! - `Fetcher`: Bounded HTTP GET/HEAD against a single URL
//! - `ScrapedContent`: A fetched page with cleaned text and metadata
//! - `extract_content`: HTML-to-clean-text extraction with noise removal
//! - `extract_links` / `extract_documentation_urls`: hyperlink discovery
//!
//! ## Features
//!
//! - URL validation and normalization before any network call
//! - Fixed browser-like header set and configurable timeout/size cap
//! - Boilerplate removal via a selector denylist applied before extraction
//! - Same-origin, pattern, and exact-match dedup filtering of links
//! - Documentation-path policy filtering tuned for common doc-site layouts
//!
//! Scraping here is deliberately single-page: recursive multi-hop crawling,
//! sitemap parsing, and JavaScript rendering are out of scope.

mod config;
mod content;
mod docs;
mod error;
mod fetcher;
mod links;

pub use config::ScrapeConfig;
pub use content::extract_content;
pub use docs::{extract_documentation_urls, DocUrlOptions};
pub use error::ScrapeError;
pub use fetcher::Fetcher;
pub use links::{extract_links, ExtractedUrl, LinkExtractionOptions, UrlExtractionResult};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Result of fetching and cleaning one page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapedContent {
    /// Canonical absolute URL that was actually fetched
    pub url: String,

    /// Page title, or `"Untitled"` when none was found
    pub title: String,

    /// Cleaned main-body text
    pub content: String,

    /// Structural metadata derived during extraction
    pub metadata: ContentMetadata,
}

/// Metadata for a scraped page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentMetadata {
    /// When the page was scraped
    pub scraped_at: DateTime<Utc>,

    /// Character length of the cleaned content
    pub content_length: usize,

    /// Whether the (noise-stripped) page contained any images
    pub has_images: bool,

    /// Whether the (noise-stripped) page contained any links
    pub has_links: bool,
}
