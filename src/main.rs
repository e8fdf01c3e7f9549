//! # docdex CLI Application
//!
//! Command-line interface for the documentation indexing toolkit.
//!
//! ## Key Components
//!
//! - CLI argument parsing with clap
//! - Subcommands for the documentation pipeline:
//!   - `discover`: Documentation URL discovery from a seed page
//!   - `scrape`: Single-page content extraction
//!   - `check`: Scrapeability probe for a URL
//!   - `index`: Bulk documentation indexing
//!   - `search`: Query the indexed documentation
//!   - `list`: Inspect indexed records
//!   - `serve`: JSON-lines tool server over stdin/stdout
//!
//! ## Features
//!
//! - Configurable fetching with timeout and inter-request delay controls
//! - Progress reporting for long-running indexing runs
//! - Both JSON and text output formats

use anyhow::anyhow;
use clap::{Args, CommandFactory, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::instrument;

use docdex::index::{
    AddItemsRequest, BulkIndexConfig, BulkIndexRequest, BulkIndexer, DocumentMetadata,
    GetItemsRequest, MemoryIndex, SearchFilters, VectorIndex, DEFAULT_COLLECTION,
};
use docdex::scrape::{
    extract_content, extract_documentation_urls, DocUrlOptions, Fetcher, ScrapeConfig,
};
use docdex::search::{list_documents, search_documents, SearchOptions};
use docdex::tools::{dispatch, State};

#[derive(Parser)]
#[command(author, version, about = "Documentation scraping, indexing, and search", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Discover documentation URLs from a seed page
    Discover(DiscoverArgs),

    /// Fetch a page and extract its main content
    Scrape(ScrapeArgs),

    /// Check whether a URL serves scrapeable HTML
    Check(CheckArgs),

    /// Discover and index documentation for a library
    Index(IndexArgs),

    /// Search indexed documentation
    Search(SearchArgs),

    /// List indexed documentation records
    List(ListArgs),

    /// Serve the tool surface over stdin/stdout as JSON lines
    Serve(ServeArgs),
}

#[derive(Args, Debug)]
struct DiscoverArgs {
    /// Seed page URL
    #[arg(required = true)]
    url: String,

    /// Maximum number of URLs to return
    #[arg(short, long, default_value = "500")]
    max_urls: usize,

    /// Output format (text|json)
    #[arg(short, long, default_value = "text", value_parser = ["text", "json"])]
    format: String,
}

#[derive(Args, Debug)]
struct ScrapeArgs {
    /// Page URL
    #[arg(required = true)]
    url: String,

    /// Output format (text|json)
    #[arg(short, long, default_value = "text", value_parser = ["text", "json"])]
    format: String,
}

#[derive(Args, Debug)]
struct CheckArgs {
    /// URL to probe
    #[arg(required = true)]
    url: String,
}

#[derive(Args, Debug)]
struct IndexArgs {
    /// Seed page URL to discover documentation from
    #[arg(required = true)]
    url: String,

    /// Library the documentation belongs to
    #[arg(required = true)]
    library: String,

    /// Library version
    #[arg(short, long, default_value = "latest")]
    version: String,

    /// Category for the indexed documents
    #[arg(short, long, default_value = "documentation")]
    category: String,

    /// Fetch and extract full page content per URL
    #[arg(short, long)]
    extract_content: bool,

    /// Delay between requests in milliseconds
    #[arg(short, long, default_value = "100")]
    delay: u64,

    /// Run a search against the freshly built index after indexing
    #[arg(short, long)]
    query: Option<String>,

    /// Save the indexed records to a snapshot file
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct SearchArgs {
    /// Search query
    #[arg(required = true)]
    query: String,

    /// Snapshot file produced by `index --output`
    #[arg(short, long, default_value = "index.json")]
    input: PathBuf,

    /// Filter by library
    #[arg(long)]
    library: Option<String>,

    /// Filter by version
    #[arg(long)]
    version: Option<String>,

    /// Filter by category
    #[arg(long)]
    category: Option<String>,

    /// Limit results
    #[arg(short, long, default_value = "10")]
    limit: usize,

    /// Output format (text|json)
    #[arg(short, long, default_value = "text", value_parser = ["text", "json"])]
    format: String,
}

#[derive(Args, Debug)]
struct ListArgs {
    /// Snapshot file produced by `index --output`
    #[arg(short, long, default_value = "index.json")]
    input: PathBuf,

    /// Filter by library
    #[arg(long)]
    library: Option<String>,

    /// Maximum number of records
    #[arg(short, long, default_value = "50")]
    limit: usize,

    /// Number of records to skip
    #[arg(short, long, default_value = "0")]
    offset: usize,
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Delay between requests in milliseconds during indexing
    #[arg(short, long, default_value = "100")]
    delay: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    docdex::telemetry::init_tracing_subscriber();

    match cli.command {
        Some(Commands::Discover(args)) => discover_command(args).await?,
        Some(Commands::Scrape(args)) => scrape_command(args).await?,
        Some(Commands::Check(args)) => check_command(args).await?,
        Some(Commands::Index(args)) => index_command(args).await?,
        Some(Commands::Search(args)) => search_command(args).await?,
        Some(Commands::List(args)) => list_command(args).await?,
        Some(Commands::Serve(args)) => serve_command(args).await?,
        None => {
            Cli::command().print_help()?;
        }
    }

    Ok(())
}

#[instrument]
async fn discover_command(args: DiscoverArgs) -> anyhow::Result<()> {
    let fetcher = Fetcher::new(ScrapeConfig::default());
    let options = DocUrlOptions {
        max_urls: args.max_urls,
        ..Default::default()
    };

    let result = extract_documentation_urls(&fetcher, &args.url, &options).await?;

    match args.format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&result)?),
        _ => {
            println!(
                "Found {} documentation URLs at {} (showing {})",
                result.total_found,
                result.base_url,
                result.extracted_urls.len()
            );
            for entry in &result.extracted_urls {
                println!("{} - {}", entry.url, entry.text);
            }
        }
    }

    Ok(())
}

#[instrument]
async fn scrape_command(args: ScrapeArgs) -> anyhow::Result<()> {
    let fetcher = Fetcher::new(ScrapeConfig::default());
    let html = fetcher.fetch(&args.url).await?;
    let content = extract_content(&html, &args.url);

    match args.format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&content)?),
        _ => {
            println!("Title: {}", content.title);
            println!("Length: {} chars", content.metadata.content_length);
            println!();
            println!("{}", content.content);
        }
    }

    Ok(())
}

#[instrument]
async fn check_command(args: CheckArgs) -> anyhow::Result<()> {
    let fetcher = Fetcher::new(ScrapeConfig::default());
    let scrapeable = fetcher.is_scrapeable(&args.url).await;

    println!(
        "{} is {}",
        args.url,
        if scrapeable {
            "scrapeable"
        } else {
            "not scrapeable"
        }
    );

    Ok(())
}

/// One record in an index snapshot file
#[derive(Debug, Serialize, Deserialize)]
struct SnapshotRecord {
    id: String,
    document: String,
    metadata: DocumentMetadata,
}

async fn save_snapshot(index: &MemoryIndex, path: &PathBuf) -> anyhow::Result<usize> {
    let stored = index
        .get_items(DEFAULT_COLLECTION, GetItemsRequest::default())
        .await?;

    let records: Vec<SnapshotRecord> = stored
        .ids
        .into_iter()
        .zip(stored.documents)
        .zip(stored.metadatas)
        .map(|((id, document), metadata)| SnapshotRecord {
            id,
            document,
            metadata,
        })
        .collect();

    let json = serde_json::to_string_pretty(&records)?;
    tokio::fs::write(path, json).await?;
    Ok(records.len())
}

async fn load_snapshot(path: &PathBuf) -> anyhow::Result<MemoryIndex> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| anyhow!("cannot read snapshot {}: {}", path.display(), e))?;
    let records: Vec<SnapshotRecord> = serde_json::from_str(&content)?;

    let index = MemoryIndex::new();
    if records.is_empty() {
        return Ok(index);
    }

    let mut request = AddItemsRequest {
        ids: Vec::with_capacity(records.len()),
        documents: Vec::with_capacity(records.len()),
        metadatas: Vec::with_capacity(records.len()),
    };
    for record in records {
        request.ids.push(record.id);
        request.documents.push(record.document);
        request.metadatas.push(record.metadata);
    }
    index.add_items(DEFAULT_COLLECTION, request).await?;
    Ok(index)
}

#[instrument]
async fn index_command(args: IndexArgs) -> anyhow::Result<()> {
    println!("Discovering documentation at {}...", args.url);

    let scrape_config = ScrapeConfig::builder().request_delay_ms(args.delay).build();
    let indexer = BulkIndexer::new(scrape_config, BulkIndexConfig::default());
    let index = MemoryIndex::new();

    let mut request = BulkIndexRequest::new(&args.url, &args.library);
    request.version = args.version;
    request.category = args.category;
    request.extract_content = args.extract_content;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner} {msg}")
            .map_err(|e| anyhow!("invalid progress template: {}", e))?,
    );
    spinner.set_message(format!("Indexing documentation for {}...", args.library));
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));

    let report = indexer.bulk_index(&index, request).await?;
    spinner.finish_and_clear();

    println!(
        "Indexed {}/{} URLs for {}",
        report.successful.len(),
        report.total(),
        args.library
    );
    for failed in &report.failed {
        println!("  failed: {} ({})", failed.url, failed.error);
    }

    if let Some(output) = &args.output {
        let written = save_snapshot(&index, output).await?;
        println!("Saved {} records to {}", written, output.display());
    }

    if let Some(query) = args.query {
        let results = search_documents(
            &index,
            DEFAULT_COLLECTION,
            &query,
            SearchOptions::default(),
        )
        .await?;
        print_search_results(&results);
    }

    Ok(())
}

#[instrument]
async fn search_command(args: SearchArgs) -> anyhow::Result<()> {
    let index = load_snapshot(&args.input).await?;
    let options = SearchOptions {
        limit: args.limit,
        filters: SearchFilters {
            library_name: args.library,
            version: args.version,
            category: args.category,
        },
        ..Default::default()
    };

    let results = search_documents(&index, DEFAULT_COLLECTION, &args.query, options).await?;

    match args.format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&results)?),
        _ => print_search_results(&results),
    }

    Ok(())
}

fn print_search_results(results: &[docdex::search::SearchResult]) {
    println!("Found {} results", results.len());
    for (i, result) in results.iter().enumerate() {
        println!("{}. {} (score {:.2})", i + 1, result.title, result.score);
        println!("   URL: {}", result.url);
        if !result.snippet.is_empty() {
            println!("   {}", result.snippet);
        }
        println!();
    }
}

#[instrument]
async fn list_command(args: ListArgs) -> anyhow::Result<()> {
    let index = load_snapshot(&args.input).await?;
    let options = SearchOptions {
        limit: args.limit,
        offset: args.offset,
        filters: SearchFilters {
            library_name: args.library,
            ..Default::default()
        },
        ..Default::default()
    };

    let listed = list_documents(&index, DEFAULT_COLLECTION, options).await?;

    println!("Indexed documents: {}", listed.ids.len());
    for metadata in &listed.metadatas {
        println!(
            "{} - {} ({} {})",
            metadata.title, metadata.url, metadata.library_name, metadata.version
        );
    }

    Ok(())
}

/// Serve tool calls as JSON lines over stdin/stdout
///
/// Each request line is `{"tool": <name>, "params": {...}}`; each response
/// line is the tool's JSON payload or `{"success": false, "error": ...}`.
/// Index and parameter state lives for the duration of the session.
#[instrument]
async fn serve_command(args: ServeArgs) -> anyhow::Result<()> {
    let scrape_config = ScrapeConfig::builder().request_delay_ms(args.delay).build();
    let state = State::in_memory(scrape_config);

    eprintln!(
        "docdex tool server ready ({} tools)",
        docdex::tools::tools().len()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<serde_json::Value>(line) {
            Ok(request) => {
                let name = request.get("tool").and_then(|v| v.as_str());
                let params = request
                    .get("params")
                    .cloned()
                    .unwrap_or_else(|| serde_json::json!({}));
                match name {
                    Some(name) => match dispatch(&state, name, params).await {
                        Ok(payload) => payload,
                        Err(e) => serde_json::json!({
                            "success": false,
                            "error": e.to_string(),
                        }),
                    },
                    None => serde_json::json!({
                        "success": false,
                        "error": "Missing tool field",
                    }),
                }
            }
            Err(e) => serde_json::json!({
                "success": false,
                "error": format!("Malformed request: {}", e),
            }),
        };

        println!("{}", serde_json::to_string(&response)?);
    }

    Ok(())
}
