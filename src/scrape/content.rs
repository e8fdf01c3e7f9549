//! HTML content extraction
//!
//! Turns raw HTML into cleaned main-body text plus structural metadata.
//! Noise elements are removed from the tree before the title or content is
//! resolved, so boilerplate cannot leak into either. Extraction never fails
//! for "no content found"; it degrades to the full body text.

use regex::Regex;
use scraper::{Html, Selector};
use std::sync::OnceLock;
use tracing::warn;

use crate::scrape::{ContentMetadata, ScrapedContent};

/// Structural and noise elements removed before extraction
const NOISE_SELECTORS: &[&str] = &[
    "script",
    "style",
    "noscript",
    "nav",
    "header",
    "footer",
    "aside",
    ".navigation",
    ".menu",
    ".sidebar",
    ".breadcrumb",
    ".breadcrumbs",
    ".comments",
    ".comment",
    ".social-share",
    ".share-buttons",
    ".ads",
    ".advertisement",
    ".popup",
    ".modal",
    ".cookie-banner",
    "#nav",
    "#header",
    "#footer",
    "#sidebar",
    "#comments",
];

/// Title candidates, tried in order
const TITLE_SELECTORS: &[&str] = &[
    "title",
    "h1",
    ".title",
    ".page-title",
    ".post-title",
    ".article-title",
    ".entry-title",
];

/// Main-content candidates, tried in order
const CONTENT_SELECTORS: &[&str] = &[
    "main",
    "article",
    ".content",
    ".main-content",
    ".post-content",
    ".article-content",
    ".entry-content",
    ".documentation",
    ".docs-content",
    ".markdown-body",
    "#content",
    "#main-content",
];

/// Minimum character count for a content candidate to be considered meaningful
const MIN_CONTENT_LENGTH: usize = 100;

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("valid regex"))
}

fn boilerplate_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)(skip to (main )?content|edit this page|share (this )?(page|article|post)|was this (page|article) helpful\??|on this page|table of contents|previous page|next page|back to top|all rights reserved|copyright (©|\(c\))[^.]*)",
        )
        .expect("valid regex")
    })
}

fn dots_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\.{4,}").expect("valid regex"))
}

fn question_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\?{2,}").expect("valid regex"))
}

fn exclamation_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"!{2,}").expect("valid regex"))
}

/// Clean extracted text
///
/// Collapses whitespace runs, strips known boilerplate phrases, and collapses
/// repeated punctuation. Cleaning is idempotent: cleaning already-cleaned
/// text yields the same text.
pub fn clean_text(text: &str) -> String {
    let text = boilerplate_re().replace_all(text, " ");
    let text = dots_re().replace_all(&text, "...");
    let text = question_re().replace_all(&text, "?");
    let text = exclamation_re().replace_all(&text, "!");
    let text = whitespace_re().replace_all(&text, " ");
    text.trim().to_string()
}

/// Remove all elements matching the noise denylist from the parsed document
fn remove_noise(document: &mut Html) {
    for selector_str in NOISE_SELECTORS {
        let selector = match Selector::parse(selector_str) {
            Ok(selector) => selector,
            Err(e) => {
                warn!("Failed to parse noise selector '{}': {}", selector_str, e);
                continue;
            }
        };

        let ids: Vec<_> = document.select(&selector).map(|el| el.id()).collect();
        for id in ids {
            if let Some(mut node) = document.tree.get_mut(id) {
                node.detach();
            }
        }
    }
}

/// Resolve the page title from the prioritized selector list
fn extract_title(document: &Html) -> String {
    for selector_str in TITLE_SELECTORS {
        let selector = match Selector::parse(selector_str) {
            Ok(selector) => selector,
            Err(e) => {
                warn!("Failed to parse title selector '{}': {}", selector_str, e);
                continue;
            }
        };

        for element in document.select(&selector) {
            let text = clean_text(&element.text().collect::<String>());
            if !text.is_empty() {
                return text;
            }
        }
    }

    "Untitled".to_string()
}

/// Resolve the main-body text from the prioritized selector list
///
/// The first candidate whose cleaned text exceeds the minimum meaningful
/// length wins; otherwise the full body text is the fallback.
fn extract_body_text(document: &Html) -> String {
    for selector_str in CONTENT_SELECTORS {
        let selector = match Selector::parse(selector_str) {
            Ok(selector) => selector,
            Err(e) => {
                warn!("Failed to parse content selector '{}': {}", selector_str, e);
                continue;
            }
        };

        if let Some(element) = document.select(&selector).next() {
            let text = clean_text(&element.text().collect::<Vec<_>>().join(" "));
            if text.len() > MIN_CONTENT_LENGTH {
                return text;
            }
        }
    }

    let body_selector = Selector::parse("body").expect("valid selector");
    document
        .select(&body_selector)
        .next()
        .map(|body| clean_text(&body.text().collect::<Vec<_>>().join(" ")))
        .unwrap_or_default()
}

/// Check whether any element matches the given selector
fn has_any(document: &Html, selector_str: &str) -> bool {
    Selector::parse(selector_str)
        .map(|selector| document.select(&selector).next().is_some())
        .unwrap_or(false)
}

/// Extract cleaned content and metadata from raw HTML
pub fn extract_content(html: &str, url: &str) -> ScrapedContent {
    let mut document = Html::parse_document(html);
    remove_noise(&mut document);

    let title = extract_title(&document);
    let content = extract_body_text(&document);
    let has_images = has_any(&document, "img");
    let has_links = has_any(&document, "a[href]");

    let content_length = content.chars().count();
    ScrapedContent {
        url: url.to_string(),
        title,
        content,
        metadata: ContentMetadata {
            scraped_at: chrono::Utc::now(),
            content_length,
            has_images,
            has_links,
        },
    }
}
