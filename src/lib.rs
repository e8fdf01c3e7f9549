//! # docdex - Documentation Scraping and Indexing for Rust
//!
//! This crate provides tooling for discovering documentation pages on the web,
//! extracting their content, and feeding them into a vector index for later
//! similarity search. Capabilities are also exposed as named, schema-described
//! tools over a simple request/response framing.
//!
//! ## Features
//!
//! - Bounded, polite single-page fetching with browser-like headers
//! - HTML content extraction with boilerplate removal and text cleanup
//! - Hyperlink discovery with same-origin, pattern, and dedup filtering
//! - Documentation-URL filtering tuned for common doc-site conventions
//! - Best-effort bulk indexing with per-URL failure containment
//! - Typed search filters translated into index filter clauses
//! - Async API with Tokio
//! - Robust error handling and logging
//!
//! ## Example
//!
//! ```rust,no_run
//! use docdex::index::{BulkIndexConfig, BulkIndexRequest, BulkIndexer, MemoryIndex};
//! use docdex::scrape::ScrapeConfig;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let index = MemoryIndex::new();
//!     let indexer = BulkIndexer::new(ScrapeConfig::default(), BulkIndexConfig::default());
//!
//!     let report = indexer
//!         .bulk_index(&index, BulkIndexRequest::new("https://docs.rs/tokio", "tokio"))
//!         .await?;
//!
//!     println!(
//!         "indexed {} pages, {} failed",
//!         report.successful.len(),
//!         report.failed.len()
//!     );
//!     Ok(())
//! }
//! ```

mod error;

pub mod index;
pub mod kv;
pub mod scrape;
pub mod search;
pub mod telemetry;
pub mod tools;

pub use error::Error;

/// Re-export of common types for public use
pub mod prelude {
    pub use crate::error::Error;
    pub use crate::error::Result;
}
