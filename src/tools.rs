//! Tool surface for the documentation server
//!
//! This module defines the externally callable tools and their handler
//! functions. It provides:
//!
//! - Search tools: search_documentation, search_by_keywords, list_documentation
//! - Ingestion tools: index_documentation, extract_urls, scrape_url, check_url
//! - Parameter tools: get/set/delete/list_parameter over the key-value store
//! - A mock weather tool kept for connectivity checks
//!
//! Each tool is defined with a JSON input schema and dispatched by name to a
//! handler that validates its inputs and runs the operation against shared
//! state.

mod handlers;

pub use handlers::dispatch;

use serde_json::{json, Value};
use thiserror::Error;

use crate::index::{BulkIndexConfig, BulkIndexer, MemoryIndex, DEFAULT_COLLECTION};
use crate::kv::{KeyValueStore, MemoryKvStore, ParameterStore};
use crate::scrape::{Fetcher, ScrapeConfig};

/// Errors surfaced by tool handlers
#[derive(Debug, Error)]
pub enum ToolError {
    /// The caller supplied missing or malformed parameters
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    /// No tool is registered under the requested name
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// The tool ran but the operation failed
    #[error("Tool execution failed: {0}")]
    Execution(String),
}

/// A callable tool definition
#[derive(Debug, Clone)]
pub struct Tool {
    /// Tool name used for dispatch
    pub name: String,

    /// Human-readable description
    pub description: String,

    /// JSON schema of the tool's input object
    pub input_schema: Value,
}

/// Shared state the tool handlers operate on
#[derive(Clone)]
pub struct State<I, S>
where
    S: KeyValueStore,
{
    /// Vector index holding documentation records
    pub index: I,

    /// Collection the tools read and write
    pub collection: String,

    /// Parameter storage
    pub parameters: ParameterStore<S>,

    /// Page fetcher shared by scrape tools
    pub fetcher: Fetcher,

    /// Bulk indexing orchestrator
    pub indexer: BulkIndexer,
}

impl State<MemoryIndex, MemoryKvStore> {
    /// Create state backed by in-process stores
    pub fn in_memory(scrape_config: ScrapeConfig) -> Self {
        Self {
            index: MemoryIndex::new(),
            collection: DEFAULT_COLLECTION.to_string(),
            parameters: ParameterStore::new(MemoryKvStore::new()),
            fetcher: Fetcher::new(scrape_config.clone()),
            indexer: BulkIndexer::new(scrape_config, BulkIndexConfig::default()),
        }
    }
}

fn schema(properties: Value, required: &[&str]) -> Value {
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

/// All tools the server supports
pub fn tools() -> Vec<Tool> {
    vec![
        Tool {
            name: "search_documentation".to_string(),
            description: "Search indexed documentation by free-text query. Supports optional library, version, and category filters.".to_string(),
            input_schema: schema(
                json!({
                    "query": { "type": "string", "description": "Free-text search query" },
                    "library_name": { "type": "string", "description": "Restrict results to a library" },
                    "version": { "type": "string", "description": "Restrict results to a version" },
                    "category": { "type": "string", "description": "Restrict results to a category" },
                    "limit": { "type": "integer", "description": "Maximum number of results, default 10" },
                }),
                &["query"],
            ),
        },
        Tool {
            name: "search_by_keywords".to_string(),
            description: "Search indexed documentation by a set of keywords.".to_string(),
            input_schema: schema(
                json!({
                    "keywords": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Keywords to search for"
                    },
                    "limit": { "type": "integer", "description": "Maximum number of results, default 10" },
                }),
                &["keywords"],
            ),
        },
        Tool {
            name: "index_documentation".to_string(),
            description: "Discover documentation URLs from a seed page and index them for a library. Processes URLs sequentially and reports per-URL success or failure.".to_string(),
            input_schema: schema(
                json!({
                    "url": { "type": "string", "description": "Seed page to discover documentation URLs from" },
                    "library_name": { "type": "string", "description": "Library the documentation belongs to" },
                    "version": { "type": "string", "description": "Library version, default 'latest'" },
                    "category": { "type": "string", "description": "Category for the indexed documents, default 'documentation'" },
                    "extract_content": { "type": "boolean", "description": "Fetch and extract full page content per URL, default false" },
                }),
                &["url", "library_name"],
            ),
        },
        Tool {
            name: "extract_urls".to_string(),
            description: "Extract documentation URLs from a page without indexing them.".to_string(),
            input_schema: schema(
                json!({
                    "url": { "type": "string", "description": "Page to extract URLs from" },
                    "max_urls": { "type": "integer", "description": "Maximum number of URLs, default 500" },
                }),
                &["url"],
            ),
        },
        Tool {
            name: "scrape_url".to_string(),
            description: "Fetch a page and extract its main content as cleaned text.".to_string(),
            input_schema: schema(
                json!({
                    "url": { "type": "string", "description": "Page to scrape" },
                }),
                &["url"],
            ),
        },
        Tool {
            name: "check_url".to_string(),
            description: "Check whether a URL serves scrapeable HTML content.".to_string(),
            input_schema: schema(
                json!({
                    "url": { "type": "string", "description": "URL to probe" },
                }),
                &["url"],
            ),
        },
        Tool {
            name: "list_documentation".to_string(),
            description: "List indexed documentation records with optional filters and pagination.".to_string(),
            input_schema: schema(
                json!({
                    "library_name": { "type": "string", "description": "Restrict to a library" },
                    "version": { "type": "string", "description": "Restrict to a version" },
                    "category": { "type": "string", "description": "Restrict to a category" },
                    "limit": { "type": "integer", "description": "Maximum number of records, default 10" },
                    "offset": { "type": "integer", "description": "Number of records to skip, default 0" },
                }),
                &[],
            ),
        },
        Tool {
            name: "get_parameter".to_string(),
            description: "Fetch a stored configuration parameter by name.".to_string(),
            input_schema: schema(
                json!({
                    "name": { "type": "string", "description": "Parameter name" },
                }),
                &["name"],
            ),
        },
        Tool {
            name: "set_parameter".to_string(),
            description: "Store a configuration parameter, replacing any existing value.".to_string(),
            input_schema: schema(
                json!({
                    "name": { "type": "string", "description": "Parameter name" },
                    "value": { "type": "string", "description": "Parameter value" },
                }),
                &["name", "value"],
            ),
        },
        Tool {
            name: "delete_parameter".to_string(),
            description: "Delete a stored configuration parameter.".to_string(),
            input_schema: schema(
                json!({
                    "name": { "type": "string", "description": "Parameter name" },
                }),
                &["name"],
            ),
        },
        Tool {
            name: "list_parameters".to_string(),
            description: "List all stored configuration parameter names.".to_string(),
            input_schema: schema(json!({}), &[]),
        },
        Tool {
            name: "get_weather".to_string(),
            description: "Get mock weather for a location. Useful as a connectivity check.".to_string(),
            input_schema: schema(
                json!({
                    "location": { "type": "string", "description": "Location name" },
                }),
                &["location"],
            ),
        },
    ]
}
