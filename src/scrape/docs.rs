//! Documentation URL filtering
//!
//! A policy layer over link extraction that narrows a general link set down
//! to probable documentation pages, using path-pattern inclusion and
//! exclusion rules tuned for common doc-site conventions.

use regex::Regex;
use tracing::{debug, instrument};

use crate::scrape::error::ScrapeError;
use crate::scrape::fetcher::Fetcher;
use crate::scrape::links::{extract_links, LinkExtractionOptions, UrlExtractionResult};

/// Containers where documentation links usually live
const DOC_LINK_SELECTORS: &[&str] = &[
    "a[href*='/docs/']",
    "a[href*='/doc/']",
    "nav a[href]",
    ".navigation a[href]",
    ".sidebar a[href]",
    ".toc a[href]",
    ".table-of-contents a[href]",
    ".menu a[href]",
    "main a[href]",
    ".content a[href]",
    "article a[href]",
];

/// Options for documentation URL discovery
///
/// Caller-supplied values replace the corresponding defaults wholesale; they
/// are not merged with them.
#[derive(Debug, Clone)]
pub struct DocUrlOptions {
    /// Inclusion pattern for documentation-like paths
    pub doc_path_pattern: Regex,

    /// Exclusion patterns applied as a second pass after extraction
    pub exclude_patterns: Vec<Regex>,

    /// Cap on returned URLs
    pub max_urls: usize,
}

impl Default for DocUrlOptions {
    fn default() -> Self {
        Self {
            doc_path_pattern: Regex::new(r"(?i)/docs?/").expect("valid regex"),
            exclude_patterns: vec![
                Regex::new(r"(?i)\.(png|jpe?g|gif|svg|ico|css|js|json|pdf|zip|tar|gz|tgz|xz|mp4|webm|woff2?|ttf|eot)(\?|#|$)")
                    .expect("valid regex"),
                Regex::new(r"#").expect("valid regex"),
                Regex::new(r"(?i)/api/").expect("valid regex"),
                Regex::new(r"(?i)changelog").expect("valid regex"),
                Regex::new(r"(?i)/blog/").expect("valid regex"),
            ],
            max_urls: 500,
        }
    }
}

/// Discover probable documentation URLs starting from a seed page
///
/// Fetches the seed page, extracts same-origin links restricted to
/// documentation-link containers and the doc-path inclusion pattern, then
/// drops anything matching the exclusion patterns. `total_found` reflects
/// the post-exclusion, pre-truncation count.
#[instrument(skip(fetcher, options))]
pub async fn extract_documentation_urls(
    fetcher: &Fetcher,
    seed_url: &str,
    options: &DocUrlOptions,
) -> Result<UrlExtractionResult, ScrapeError> {
    let html = fetcher.fetch(seed_url).await?;
    extract_documentation_urls_from_html(&html, seed_url, options)
}

/// Documentation URL discovery over already-fetched HTML
pub fn extract_documentation_urls_from_html(
    html: &str,
    base_url: &str,
    options: &DocUrlOptions,
) -> Result<UrlExtractionResult, ScrapeError> {
    let link_options = LinkExtractionOptions {
        filter_pattern: Some(options.doc_path_pattern.clone()),
        include_external: false,
        max_urls: None,
        link_selectors: Some(DOC_LINK_SELECTORS.iter().map(|s| s.to_string()).collect()),
    };

    let mut result = extract_links(html, base_url, &link_options)?;

    result
        .extracted_urls
        .retain(|entry| !options.exclude_patterns.iter().any(|p| p.is_match(&entry.url)));

    result.total_found = result.extracted_urls.len();
    result.extracted_urls.truncate(options.max_urls);

    debug!(
        "Documentation URL discovery found {} candidates from {}",
        result.total_found, base_url
    );

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://example.com/docs/";

    #[test]
    fn test_default_inclusion_and_exclusion() {
        let html = r#"<html><body><nav>
            <a href="/docs/intro">Intro</a>
            <a href="/docs/changelog">Changelog</a>
            <a href="/blog/post">Blog</a>
        </nav></body></html>"#;

        let result =
            extract_documentation_urls_from_html(html, BASE, &DocUrlOptions::default()).unwrap();

        assert_eq!(result.total_found, 1);
        assert_eq!(result.extracted_urls[0].url, "https://example.com/docs/intro");
    }

    #[test]
    fn test_asset_anchor_and_api_exclusions() {
        let html = r#"<html><body><nav>
            <a href="/docs/logo.png">Logo</a>
            <a href="/docs/guide#section">Anchor</a>
            <a href="/docs/api/reference">Api</a>
            <a href="/docs/guide">Guide</a>
        </nav></body></html>"#;

        let result =
            extract_documentation_urls_from_html(html, BASE, &DocUrlOptions::default()).unwrap();

        assert_eq!(result.total_found, 1);
        assert_eq!(result.extracted_urls[0].url, "https://example.com/docs/guide");
    }

    #[test]
    fn test_total_found_is_post_exclusion_pre_truncation() {
        let html = r#"<html><body><nav>
            <a href="/docs/a">a</a>
            <a href="/docs/b">b</a>
            <a href="/docs/c">c</a>
            <a href="/docs/changelog">x</a>
        </nav></body></html>"#;

        let options = DocUrlOptions {
            max_urls: 2,
            ..Default::default()
        };
        let result = extract_documentation_urls_from_html(html, BASE, &options).unwrap();

        assert_eq!(result.total_found, 3);
        assert_eq!(result.extracted_urls.len(), 2);
    }

    #[test]
    fn test_custom_pattern_replaces_default() {
        let html = r#"<html><body><nav>
            <a href="/docs/intro">docs</a>
            <a href="/guide/start">guide</a>
        </nav></body></html>"#;

        let options = DocUrlOptions {
            doc_path_pattern: Regex::new(r"(?i)/guide/").unwrap(),
            ..Default::default()
        };
        let result =
            extract_documentation_urls_from_html(html, "https://example.com/", &options).unwrap();

        assert_eq!(result.total_found, 1);
        assert_eq!(result.extracted_urls[0].url, "https://example.com/guide/start");
    }

    #[test]
    fn test_external_links_never_included() {
        let html = r#"<html><body><nav>
            <a href="https://other.com/docs/intro">external</a>
            <a href="/docs/intro">internal</a>
        </nav></body></html>"#;

        let result =
            extract_documentation_urls_from_html(html, BASE, &DocUrlOptions::default()).unwrap();

        assert_eq!(result.total_found, 1);
        assert_eq!(result.extracted_urls[0].url, "https://example.com/docs/intro");
    }
}
