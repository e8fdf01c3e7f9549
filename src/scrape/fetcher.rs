//! Bounded single-page fetching
//!
//! The fetcher performs one HTTP GET (or HEAD probe) against a validated URL
//! with a fixed timeout, a response size cap, and a browser-like header set.
//! It does not follow links or retry; retry policy is a caller concern.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::Client as ReqwestClient;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::scrape::error::ScrapeError;
use crate::scrape::ScrapeConfig;

/// HTTP fetcher for single pages
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: ReqwestClient,
    config: ScrapeConfig,
}

impl Fetcher {
    /// Create a new fetcher from the given configuration
    pub fn new(config: ScrapeConfig) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));

        let client = ReqwestClient::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .build()
            .expect("Failed to create HTTP client");

        Self { client, config }
    }

    /// Validate a URL and normalize it to absolute form
    ///
    /// Only `http` and `https` schemes are accepted.
    pub fn validate_url(url: &str) -> Result<Url, ScrapeError> {
        let parsed = Url::parse(url)
            .map_err(|e| ScrapeError::invalid_url(url, format!("not a valid URL: {}", e)))?;

        match parsed.scheme() {
            "http" | "https" => Ok(parsed),
            other => Err(ScrapeError::invalid_url(
                url,
                format!("unsupported scheme '{}'", other),
            )),
        }
    }

    /// Fetch the raw HTML text of a page
    ///
    /// The URL is validated and re-serialized before the request is made. The
    /// response body is read incrementally and the fetch fails once it exceeds
    /// the configured size cap.
    #[instrument(skip(self))]
    pub async fn fetch(&self, url: &str) -> Result<String, ScrapeError> {
        let target = Self::validate_url(url)?;
        let target_str = target.to_string();

        debug!("Fetching {}", target_str);
        let response = self
            .client
            .get(target)
            .send()
            .await
            .map_err(|e| ScrapeError::fetch(&target_str, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::fetch(
                &target_str,
                format!("HTTP status {}", status),
            ));
        }

        // Reject early when the server declares an oversized body
        if let Some(declared) = response.content_length() {
            if declared as usize > self.config.max_response_bytes {
                return Err(ScrapeError::fetch(
                    &target_str,
                    format!(
                        "declared content length {} exceeds cap of {} bytes",
                        declared, self.config.max_response_bytes
                    ),
                ));
            }
        }

        let mut body: Vec<u8> = Vec::new();
        let mut response = response;
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| ScrapeError::fetch(&target_str, e))?
        {
            if body.len() + chunk.len() > self.config.max_response_bytes {
                return Err(ScrapeError::fetch(
                    &target_str,
                    format!(
                        "response exceeds cap of {} bytes",
                        self.config.max_response_bytes
                    ),
                ));
            }
            body.extend_from_slice(&chunk);
        }

        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    /// Probe whether a URL serves HTML content
    ///
    /// Issues a lightweight HEAD request; returns true only when the response
    /// content-type indicates HTML. Any failure, including a non-HTTP URL,
    /// yields false rather than an error.
    #[instrument(skip(self))]
    pub async fn is_scrapeable(&self, url: &str) -> bool {
        let target = match Self::validate_url(url) {
            Ok(target) => target,
            Err(e) => {
                debug!("Not scrapeable: {}", e);
                return false;
            }
        };

        match self.client.head(target).send().await {
            Ok(response) => {
                if !response.status().is_success() {
                    return false;
                }
                response
                    .headers()
                    .get(reqwest::header::CONTENT_TYPE)
                    .and_then(|v| v.to_str().ok())
                    .map(|ct| ct.contains("text/html") || ct.contains("application/xhtml"))
                    .unwrap_or(false)
            }
            Err(e) => {
                warn!("HEAD probe failed for {}: {}", url, e);
                false
            }
        }
    }
}
