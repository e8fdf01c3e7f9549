//! # Scrape Configuration Module
//!
//! Configuration options for page fetching, including request timeout,
//! response size cap, and header identity. Uses a builder pattern for
//! flexible configuration.
//!
//! There is deliberately no process-wide default scraper instance; every
//! component takes an explicit `ScrapeConfig` at construction.

use std::time::Duration;

/// Configuration for page fetching
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    /// Timeout for a single request in seconds
    pub timeout_secs: u64,

    /// Maximum response size in bytes
    pub max_response_bytes: usize,

    /// User agent to use for requests
    pub user_agent: String,

    /// Delay in milliseconds between consecutive requests in a batch
    pub request_delay_ms: u64,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            max_response_bytes: 1024 * 1024,
            user_agent: format!("docdex/{}", env!("CARGO_PKG_VERSION")),
            request_delay_ms: 100,
        }
    }
}

/// Builder for ScrapeConfig
#[derive(Debug, Default)]
pub struct ScrapeConfigBuilder {
    config: ScrapeConfig,
}

impl ScrapeConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: ScrapeConfig::default(),
        }
    }

    /// Set the request timeout in seconds
    pub fn timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.config.timeout_secs = timeout_secs;
        self
    }

    /// Set the maximum response size in bytes
    pub fn max_response_bytes(mut self, max_response_bytes: usize) -> Self {
        self.config.max_response_bytes = max_response_bytes;
        self
    }

    /// Set the user agent to use for requests
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Set the delay in milliseconds between consecutive batch requests
    pub fn request_delay_ms(mut self, request_delay_ms: u64) -> Self {
        self.config.request_delay_ms = request_delay_ms;
        self
    }

    /// Build the configuration
    pub fn build(self) -> ScrapeConfig {
        self.config
    }
}

impl ScrapeConfig {
    /// Create a new builder
    pub fn builder() -> ScrapeConfigBuilder {
        ScrapeConfigBuilder::new()
    }

    /// Get the request timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Get the inter-request delay as a Duration
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ScrapeConfig::default();
        assert_eq!(config.timeout_secs, 10);
        assert_eq!(config.max_response_bytes, 1024 * 1024);
        assert_eq!(config.request_delay_ms, 100);
    }

    #[test]
    fn test_builder() {
        let config = ScrapeConfig::builder()
            .timeout_secs(30)
            .max_response_bytes(4096)
            .user_agent("test-agent")
            .request_delay_ms(250)
            .build();

        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.max_response_bytes, 4096);
        assert_eq!(config.user_agent, "test-agent");
        assert_eq!(config.request_delay(), Duration::from_millis(250));
    }
}
