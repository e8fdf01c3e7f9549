//! Bulk indexing orchestration
//!
//! Drives ingestion from a seed URL: discovers candidate documentation URLs,
//! derives per-document metadata, optionally fetches full page content, and
//! writes each candidate into the vector index. The batch is best-effort and
//! at-least-once: one URL's failure is recorded and never aborts the rest.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use url::Url;
use uuid::Uuid;

use crate::index::error::IndexError;
use crate::index::store::{AddItemsRequest, VectorIndex};
use crate::index::{build_searchable_text, DocKind, DocumentMetadata, DEFAULT_COLLECTION};
use crate::scrape::{
    extract_content, extract_documentation_urls, extract_links, DocUrlOptions, ExtractedUrl,
    Fetcher, LinkExtractionOptions, ScrapeConfig, ScrapedContent,
};

/// Configuration for bulk indexing
#[derive(Debug, Clone)]
pub struct BulkIndexConfig {
    /// Collection the records are written to
    pub collection: String,

    /// Documentation URL discovery options used in doc mode
    pub doc_options: DocUrlOptions,
}

impl Default for BulkIndexConfig {
    fn default() -> Self {
        Self {
            collection: DEFAULT_COLLECTION.to_string(),
            doc_options: DocUrlOptions::default(),
        }
    }
}

/// One bulk indexing request
#[derive(Debug, Clone)]
pub struct BulkIndexRequest {
    /// Seed page to discover candidate URLs from
    pub seed_url: String,

    /// Library the documentation belongs to
    pub library_name: String,

    /// Library version; defaults to "latest"
    pub version: String,

    /// Default category for every discovered document
    pub category: String,

    /// Whether to fetch and extract full page content per candidate
    pub extract_content: bool,

    /// Whether discovery uses the documentation-URL policy filter
    pub doc_mode: bool,
}

impl BulkIndexRequest {
    /// Create a request with defaults: latest version, "documentation"
    /// category, metadata-only content, doc-mode discovery
    pub fn new(seed_url: impl Into<String>, library_name: impl Into<String>) -> Self {
        Self {
            seed_url: seed_url.into(),
            library_name: library_name.into(),
            version: "latest".to_string(),
            category: "documentation".to_string(),
            extract_content: false,
            doc_mode: true,
        }
    }
}

/// A candidate URL that could not be indexed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedUrl {
    /// The candidate URL
    pub url: String,

    /// Human-readable cause
    pub error: String,
}

/// Outcome of one bulk indexing run
///
/// Entries preserve the discovery order of candidate URLs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BulkIndexReport {
    /// URLs that were written to the index
    pub successful: Vec<String>,

    /// URLs that failed, with their causes
    pub failed: Vec<FailedUrl>,
}

impl BulkIndexReport {
    /// Total number of candidates processed
    pub fn total(&self) -> usize {
        self.successful.len() + self.failed.len()
    }

    /// Fraction of candidates indexed successfully; 1.0 for an empty batch
    pub fn success_rate(&self) -> f64 {
        if self.total() == 0 {
            return 1.0;
        }
        self.successful.len() as f64 / self.total() as f64
    }
}

/// Why a candidate fell back to metadata-only content
#[derive(Debug, Clone)]
pub enum DegradedReason {
    /// Fetching or extracting the page content failed
    FetchFailed(String),
}

impl std::fmt::Display for DegradedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DegradedReason::FetchFailed(cause) => write!(f, "content fetch failed: {}", cause),
        }
    }
}

/// Orchestrator for bulk documentation ingestion
#[derive(Debug, Clone)]
pub struct BulkIndexer {
    fetcher: Fetcher,
    scrape_config: ScrapeConfig,
    config: BulkIndexConfig,
}

impl BulkIndexer {
    /// Create a new orchestrator
    pub fn new(scrape_config: ScrapeConfig, config: BulkIndexConfig) -> Self {
        Self {
            fetcher: Fetcher::new(scrape_config.clone()),
            scrape_config,
            config,
        }
    }

    /// Discover candidate URLs for the request
    ///
    /// A failure here aborts the whole batch; there is nothing to iterate
    /// over without a candidate list.
    async fn discover(&self, request: &BulkIndexRequest) -> Result<Vec<ExtractedUrl>, IndexError> {
        let result = if request.doc_mode {
            extract_documentation_urls(&self.fetcher, &request.seed_url, &self.config.doc_options)
                .await?
        } else {
            let html = self.fetcher.fetch(&request.seed_url).await?;
            extract_links(&html, &request.seed_url, &LinkExtractionOptions::default())?
        };
        Ok(result.extracted_urls)
    }

    /// Fetch and extract full content for one candidate, degrading instead
    /// of failing
    async fn fetch_page_content(&self, url: &str) -> Result<ScrapedContent, DegradedReason> {
        match self.fetcher.fetch(url).await {
            Ok(html) => Ok(extract_content(&html, url)),
            Err(e) => Err(DegradedReason::FetchFailed(e.to_string())),
        }
    }

    /// Index every documentation URL discoverable from the request's seed page
    ///
    /// Candidates are processed strictly sequentially with a small delay
    /// between them to bound load on the source server. Partial failure is a
    /// normal, reportable outcome, not an error.
    #[instrument(skip(self, index), fields(seed_url = %request.seed_url))]
    pub async fn bulk_index<I: VectorIndex>(
        &self,
        index: &I,
        request: BulkIndexRequest,
    ) -> Result<BulkIndexReport, IndexError> {
        let candidates = self.discover(&request).await?;
        if candidates.is_empty() {
            info!("No candidate URLs found at {}", request.seed_url);
            return Ok(BulkIndexReport::default());
        }

        info!(
            "Indexing {} candidates for library '{}'",
            candidates.len(),
            request.library_name
        );

        let mut report = BulkIndexReport::default();
        let delay = self.scrape_config.request_delay();

        for (position, candidate) in candidates.iter().enumerate() {
            match self.index_candidate(index, &request, candidate).await {
                Ok(()) => report.successful.push(candidate.url.clone()),
                Err(e) => {
                    warn!("Failed to index {}: {}", candidate.url, e);
                    report.failed.push(FailedUrl {
                        url: candidate.url.clone(),
                        error: e.to_string(),
                    });
                }
            }

            if position + 1 < candidates.len() {
                tokio::time::sleep(delay).await;
            }
        }

        info!(
            "Bulk indexing finished: {}/{} succeeded",
            report.successful.len(),
            report.total()
        );
        Ok(report)
    }

    /// Build and write the index record for one candidate URL
    async fn index_candidate<I: VectorIndex>(
        &self,
        index: &I,
        request: &BulkIndexRequest,
        candidate: &ExtractedUrl,
    ) -> Result<(), IndexError> {
        let library_name = request.library_name.to_lowercase();
        let category = request.category.to_lowercase();
        let keywords = derive_keywords(&library_name, &request.version, &category, &candidate.text);
        let section = derive_section(&candidate.url);

        let (content, title, degraded) = if request.extract_content {
            match self.fetch_page_content(&candidate.url).await {
                Ok(scraped) => (scraped.content, scraped.title, None),
                Err(reason) => {
                    debug!("Degraded to metadata-only for {}: {}", candidate.url, reason);
                    (String::new(), candidate.text.clone(), Some(reason))
                }
            }
        } else {
            (String::new(), candidate.text.clone(), None)
        };

        let content_extracted = request.extract_content && degraded.is_none();
        let title = if title.is_empty() {
            "Untitled".to_string()
        } else {
            title
        };
        let description = candidate.description.clone().unwrap_or_default();

        // Metadata-only records still carry something searchable
        let document = if content_extracted {
            content
        } else {
            let mut parts = vec![title.clone()];
            if !description.is_empty() {
                parts.push(description.clone());
            }
            parts.push(keywords.join(" "));
            parts.join("\n")
        };

        let now = Utc::now();
        let metadata = DocumentMetadata {
            url: candidate.url.clone(),
            searchable_text: build_searchable_text(
                &library_name,
                &request.version,
                &category,
                &keywords,
                &title,
            ),
            title,
            library_name,
            version: request.version.clone(),
            category,
            keywords,
            description,
            section,
            last_updated: now,
            doc_type: DocKind::UrlDocument,
            content_extracted,
            added_at: now,
        };

        index
            .add_items(
                &self.config.collection,
                AddItemsRequest {
                    ids: vec![Uuid::new_v4().to_string()],
                    documents: vec![document],
                    metadatas: vec![metadata],
                },
            )
            .await
    }
}

/// Derive a section name from a URL path
///
/// The first path segment following a `/docs/` or `/doc/` marker wins; the
/// last path segment is the fallback, and "general" covers bare roots.
pub fn derive_section(url: &str) -> String {
    let Ok(parsed) = Url::parse(url) else {
        return "general".to_string();
    };

    let segments: Vec<&str> = parsed
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default();

    for (i, segment) in segments.iter().enumerate() {
        let lowered = segment.to_lowercase();
        if (lowered == "docs" || lowered == "doc") && i + 1 < segments.len() {
            return segments[i + 1].to_string();
        }
    }

    segments
        .last()
        .map(|s| s.to_string())
        .unwrap_or_else(|| "general".to_string())
}

/// Derive the keyword set for a document
///
/// Starts from library, version, and category, then appends every word of at
/// least three characters from the anchor text, lower-cased, deduplicated
/// preserving first-seen order.
pub fn derive_keywords(
    library_name: &str,
    version: &str,
    category: &str,
    anchor_text: &str,
) -> Vec<String> {
    let mut keywords: Vec<String> = vec![
        library_name.to_lowercase(),
        version.to_string(),
        category.to_lowercase(),
    ];

    keywords.extend(
        anchor_text
            .split_whitespace()
            .map(|word| {
                word.trim_matches(|c: char| !c.is_alphanumeric())
                    .to_lowercase()
            })
            .filter(|word| word.len() >= 3),
    );

    let mut seen = std::collections::HashSet::new();
    keywords.retain(|keyword| seen.insert(keyword.clone()));
    keywords
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::store::{GetItemsRequest, MemoryIndex, QueryRequest};
    use mockito::Server;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_derive_section_from_docs_marker() {
        assert_eq!(derive_section("https://x.com/docs/hooks/intro"), "hooks");
        assert_eq!(derive_section("https://x.com/doc/guide"), "guide");
    }

    #[test]
    fn test_derive_section_fallbacks() {
        assert_eq!(derive_section("https://x.com/learn/start"), "start");
        assert_eq!(derive_section("https://x.com/"), "general");
        assert_eq!(derive_section("https://x.com/docs/"), "docs");
    }

    #[test]
    fn test_derive_keywords_order_and_dedup() {
        let keywords = derive_keywords("React", "18.2", "Frontend", "Using React Hooks in 2s");
        assert_eq!(
            keywords,
            vec!["react", "18.2", "frontend", "using", "hooks"]
        );
    }

    #[test]
    fn test_derive_keywords_strips_punctuation() {
        let keywords = derive_keywords("lib", "1.0", "docs", "Hooks, effects!");
        assert!(keywords.contains(&"hooks".to_string()));
        assert!(keywords.contains(&"effects".to_string()));
    }

    fn seed_page() -> &'static str {
        r#"<html><body><nav>
            <a href="/docs/intro">Intro Guide</a>
            <a href="/docs/hooks">Hooks Reference</a>
            <a href="/docs/setup">Setup</a>
        </nav></body></html>"#
    }

    fn test_indexer(delay_ms: u64) -> BulkIndexer {
        let scrape_config = ScrapeConfig::builder().request_delay_ms(delay_ms).build();
        BulkIndexer::new(scrape_config, BulkIndexConfig::default())
    }

    #[tokio::test]
    async fn test_bulk_index_writes_all_candidates() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/docs/")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body(seed_page())
            .create_async()
            .await;

        let index = MemoryIndex::new();
        let indexer = test_indexer(0);
        let request = BulkIndexRequest::new(format!("{}/docs/", server.url()), "React");

        let report = indexer.bulk_index(&index, request).await.unwrap();
        assert_eq!(report.successful.len(), 3);
        assert!(report.failed.is_empty());
        assert_eq!(index.count_items(DEFAULT_COLLECTION).await.unwrap(), 3);
        assert!((report.success_rate() - 1.0).abs() < f64::EPSILON);

        let stored = index
            .get_items(DEFAULT_COLLECTION, GetItemsRequest::default())
            .await
            .unwrap();
        let metadata = &stored.metadatas[0];
        assert_eq!(metadata.library_name, "react");
        assert_eq!(metadata.doc_type, DocKind::UrlDocument);
        assert_eq!(metadata.section, "intro");
        assert!(metadata.keywords.contains(&"react".to_string()));
        assert!(!metadata.content_extracted);
    }

    #[tokio::test]
    async fn test_bulk_index_empty_discovery_is_zero_work() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/docs/")
            .with_status(200)
            .with_body("<html><body><p>nothing here</p></body></html>")
            .create_async()
            .await;

        let index = MemoryIndex::new();
        let indexer = test_indexer(0);
        let request = BulkIndexRequest::new(format!("{}/docs/", server.url()), "react");

        let report = indexer.bulk_index(&index, request).await.unwrap();
        assert!(report.successful.is_empty());
        assert!(report.failed.is_empty());
    }

    #[tokio::test]
    async fn test_bulk_index_seed_failure_aborts() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/docs/")
            .with_status(500)
            .create_async()
            .await;

        let index = MemoryIndex::new();
        let indexer = test_indexer(0);
        let request = BulkIndexRequest::new(format!("{}/docs/", server.url()), "react");

        let result = indexer.bulk_index(&index, request).await;
        assert!(matches!(result, Err(IndexError::Scrape(_))));
    }

    /// Index stub that fails every write for a URL containing a marker
    #[derive(Clone)]
    struct FlakyIndex {
        inner: MemoryIndex,
        fail_on: String,
        writes: std::sync::Arc<AtomicUsize>,
    }

    impl VectorIndex for FlakyIndex {
        async fn add_items(
            &self,
            collection: &str,
            request: AddItemsRequest,
        ) -> Result<(), IndexError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            if request
                .metadatas
                .iter()
                .any(|m| m.url.contains(&self.fail_on))
            {
                return Err(IndexError::Write("simulated write failure".to_string()));
            }
            self.inner.add_items(collection, request).await
        }

        async fn query_items(
            &self,
            collection: &str,
            request: QueryRequest,
        ) -> Result<crate::index::QueryResult, IndexError> {
            self.inner.query_items(collection, request).await
        }

        async fn get_items(
            &self,
            collection: &str,
            request: GetItemsRequest,
        ) -> Result<crate::index::GetItemsResult, IndexError> {
            self.inner.get_items(collection, request).await
        }

        async fn delete_items(
            &self,
            collection: &str,
            ids: Option<Vec<String>>,
            filter: Option<crate::index::FilterClause>,
        ) -> Result<usize, IndexError> {
            self.inner.delete_items(collection, ids, filter).await
        }

        async fn count_items(&self, collection: &str) -> Result<usize, IndexError> {
            self.inner.count_items(collection).await
        }
    }

    #[tokio::test]
    async fn test_partial_batch_failure_is_contained() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/docs/")
            .with_status(200)
            .with_body(seed_page())
            .create_async()
            .await;

        let index = FlakyIndex {
            inner: MemoryIndex::new(),
            fail_on: "/docs/hooks".to_string(),
            writes: Default::default(),
        };
        let indexer = test_indexer(0);
        let request = BulkIndexRequest::new(format!("{}/docs/", server.url()), "react");

        let report = indexer.bulk_index(&index, request).await.unwrap();

        assert_eq!(report.successful.len(), 2);
        assert_eq!(report.failed.len(), 1);
        assert!(report.failed[0].url.contains("/docs/hooks"));
        assert_eq!(index.writes.load(Ordering::SeqCst), 3);
        assert!((report.success_rate() - 2.0 / 3.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_content_extraction_degrades_per_candidate() {
        let mut server = Server::new_async().await;
        let _seed = server
            .mock("GET", "/docs/")
            .with_status(200)
            .with_body(
                r#"<html><body><nav>
                    <a href="/docs/good">Good Page</a>
                    <a href="/docs/broken">Broken Page</a>
                </nav></body></html>"#,
            )
            .create_async()
            .await;
        let _good = server
            .mock("GET", "/docs/good")
            .with_status(200)
            .with_body(format!(
                "<html><head><title>Good</title></head><body><main>{}</main></body></html>",
                "page body text ".repeat(20)
            ))
            .create_async()
            .await;
        let _broken = server
            .mock("GET", "/docs/broken")
            .with_status(500)
            .create_async()
            .await;

        let index = MemoryIndex::new();
        let indexer = test_indexer(0);
        let mut request = BulkIndexRequest::new(format!("{}/docs/", server.url()), "react");
        request.extract_content = true;

        let report = indexer.bulk_index(&index, request).await.unwrap();

        // The broken page degrades to metadata-only but still succeeds
        assert_eq!(report.successful.len(), 2);
        assert!(report.failed.is_empty());

        let stored = index
            .get_items(DEFAULT_COLLECTION, GetItemsRequest::default())
            .await
            .unwrap();
        let good = stored
            .metadatas
            .iter()
            .find(|m| m.url.contains("/docs/good"))
            .unwrap();
        let broken = stored
            .metadatas
            .iter()
            .find(|m| m.url.contains("/docs/broken"))
            .unwrap();
        assert!(good.content_extracted);
        assert_eq!(good.title, "Good");
        assert!(!broken.content_extracted);
        assert_eq!(broken.title, "Broken Page");
    }
}
