//! Hyperlink discovery
//!
//! Walks anchor elements in a parsed page, resolves them against a base URL,
//! and applies same-origin, pattern, and dedup filtering. Malformed hrefs are
//! skipped with a warning rather than failing the extraction.

use chrono::{DateTime, Utc};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, instrument, warn};

use crate::scrape::error::ScrapeError;
use crate::scrape::fetcher::Fetcher;

/// Maximum length of a best-effort link description
const MAX_DESCRIPTION_LENGTH: usize = 200;

/// One discovered hyperlink
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedUrl {
    /// Absolute, normalized URL
    pub url: String,

    /// Anchor text, trimmed; may be empty
    pub text: String,

    /// Optional title from a title or aria-label attribute
    pub title: Option<String>,

    /// Best-effort description, truncated to 200 characters
    pub description: Option<String>,
}

/// Output of one link discovery pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlExtractionResult {
    /// The base URL links were resolved against
    pub base_url: String,

    /// Discovered links, possibly truncated by `max_urls`
    pub extracted_urls: Vec<ExtractedUrl>,

    /// Count of qualifying links before any truncation
    pub total_found: usize,

    /// When the extraction ran
    pub scraped_at: DateTime<Utc>,
}

/// Options for link extraction
#[derive(Debug, Clone, Default)]
pub struct LinkExtractionOptions {
    /// Inclusion pattern; links not matching it are skipped
    pub filter_pattern: Option<Regex>,

    /// Whether to keep links whose host differs from the base URL's host
    pub include_external: bool,

    /// Cap on the number of returned links; `total_found` is unaffected
    pub max_urls: Option<usize>,

    /// CSS selectors restricting which anchors are considered; defaults to
    /// every anchor carrying an href
    pub link_selectors: Option<Vec<String>>,
}

/// Discover hyperlinks in raw HTML, resolved against `base_url`
#[instrument(skip(html, options))]
pub fn extract_links(
    html: &str,
    base_url: &str,
    options: &LinkExtractionOptions,
) -> Result<UrlExtractionResult, ScrapeError> {
    let base = Fetcher::validate_url(base_url)?;
    let document = Html::parse_document(html);

    let default_selectors = vec!["a[href]".to_string()];
    let selectors = options
        .link_selectors
        .as_ref()
        .unwrap_or(&default_selectors);

    let mut seen: HashSet<String> = HashSet::new();
    let mut extracted: Vec<ExtractedUrl> = Vec::new();

    for selector_str in selectors {
        let selector = match Selector::parse(selector_str) {
            Ok(selector) => selector,
            Err(e) => {
                warn!("Failed to parse link selector '{}': {}", selector_str, e);
                continue;
            }
        };

        for element in document.select(&selector) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };

            let resolved = match base.join(href) {
                Ok(resolved) => resolved,
                Err(e) => {
                    warn!("Skipping malformed href '{}': {}", href, e);
                    continue;
                }
            };

            if !options.include_external && resolved.host_str() != base.host_str() {
                continue;
            }

            let resolved_str = resolved.to_string();
            if let Some(pattern) = &options.filter_pattern {
                if !pattern.is_match(&resolved_str) {
                    continue;
                }
            }

            // Exact-match dedup after resolution. URLs differing only by a
            // trailing slash are deliberately treated as distinct.
            if !seen.insert(resolved_str.clone()) {
                continue;
            }

            extracted.push(ExtractedUrl {
                url: resolved_str,
                text: collapse_whitespace(&element.text().collect::<String>()),
                title: element
                    .value()
                    .attr("title")
                    .or_else(|| element.value().attr("aria-label"))
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty()),
                description: extract_description(&element),
            });
        }
    }

    let total_found = extracted.len();
    if let Some(max_urls) = options.max_urls {
        extracted.truncate(max_urls);
    }

    debug!(
        "Extracted {} links ({} returned) from {}",
        total_found,
        extracted.len(),
        base_url
    );

    Ok(UrlExtractionResult {
        base_url: base.to_string(),
        extracted_urls: extracted,
        total_found,
        scraped_at: Utc::now(),
    })
}

/// Best-effort description for an anchor
///
/// Tries an explicit data attribute on the anchor, then on an ancestor, then
/// the text of an adjacent paragraph or description element.
fn extract_description(element: &ElementRef) -> Option<String> {
    if let Some(desc) = element.value().attr("data-description") {
        return truncate_description(desc);
    }

    for ancestor in element.ancestors().filter_map(ElementRef::wrap) {
        if let Some(desc) = ancestor.value().attr("data-description") {
            return truncate_description(desc);
        }
    }

    for sibling in element.next_siblings().filter_map(ElementRef::wrap) {
        let name = sibling.value().name();
        let is_description = name == "p"
            || sibling
                .value()
                .attr("class")
                .is_some_and(|c| c.contains("description"));
        if is_description {
            return truncate_description(&sibling.text().collect::<String>());
        }
    }

    None
}

fn truncate_description(text: &str) -> Option<String> {
    let text = collapse_whitespace(text);
    if text.is_empty() {
        return None;
    }
    Some(text.chars().take(MAX_DESCRIPTION_LENGTH).collect())
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
