//! Tool handler dispatch
//!
//! Handlers validate their parameters, run the operation against shared
//! state, and answer with a `{"success": true, ...}` payload. Operational
//! failures become `ToolError::Execution` so the transport can shape them
//! uniformly.

use serde_json::{json, Value};
use tracing::info;

use crate::index::{BulkIndexRequest, SearchFilters, VectorIndex};
use crate::kv::KeyValueStore;
use crate::scrape::{extract_content, extract_documentation_urls, DocUrlOptions};
use crate::search::{list_documents, search_by_keywords, search_documents, SearchOptions};
use crate::tools::{State, ToolError};

fn required_str<'a>(params: &'a Value, name: &str) -> Result<&'a str, ToolError> {
    params
        .get(name)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| ToolError::InvalidParams(format!("Missing {} parameter", name)))
}

fn optional_str(params: &Value, name: &str) -> Option<String> {
    params
        .get(name)
        .and_then(Value::as_str)
        .map(str::to_string)
        .filter(|s| !s.trim().is_empty())
}

fn optional_usize(params: &Value, name: &str, default: usize) -> usize {
    params
        .get(name)
        .and_then(Value::as_u64)
        .map(|n| n as usize)
        .unwrap_or(default)
}

fn optional_bool(params: &Value, name: &str) -> bool {
    params.get(name).and_then(Value::as_bool).unwrap_or(false)
}

fn search_filters(params: &Value) -> SearchFilters {
    SearchFilters {
        library_name: optional_str(params, "library_name"),
        version: optional_str(params, "version"),
        category: optional_str(params, "category"),
    }
}

/// Dispatch a tool call by name
pub async fn dispatch<I, S>(
    state: &State<I, S>,
    name: &str,
    params: Value,
) -> Result<Value, ToolError>
where
    I: VectorIndex,
    S: KeyValueStore,
{
    info!("Dispatching tool '{}'", name);
    match name {
        "search_documentation" => handle_search(state, params).await,
        "search_by_keywords" => handle_search_by_keywords(state, params).await,
        "index_documentation" => handle_index(state, params).await,
        "extract_urls" => handle_extract_urls(state, params).await,
        "scrape_url" => handle_scrape_url(state, params).await,
        "check_url" => handle_check_url(state, params).await,
        "list_documentation" => handle_list(state, params).await,
        "get_parameter" => handle_get_parameter(state, params).await,
        "set_parameter" => handle_set_parameter(state, params).await,
        "delete_parameter" => handle_delete_parameter(state, params).await,
        "list_parameters" => handle_list_parameters(state).await,
        "get_weather" => handle_get_weather(params),
        other => Err(ToolError::UnknownTool(other.to_string())),
    }
}

async fn handle_search<I: VectorIndex, S: KeyValueStore>(
    state: &State<I, S>,
    params: Value,
) -> Result<Value, ToolError> {
    let query = required_str(&params, "query")?;
    let options = SearchOptions {
        limit: optional_usize(&params, "limit", 10),
        filters: search_filters(&params),
        ..Default::default()
    };

    let results = search_documents(&state.index, &state.collection, query, options)
        .await
        .map_err(|e| ToolError::Execution(e.to_string()))?;

    Ok(json!({
        "success": true,
        "count": results.len(),
        "results": results,
    }))
}

async fn handle_search_by_keywords<I: VectorIndex, S: KeyValueStore>(
    state: &State<I, S>,
    params: Value,
) -> Result<Value, ToolError> {
    let keywords: Vec<String> = params
        .get("keywords")
        .and_then(Value::as_array)
        .map(|values| {
            values
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .filter(|k: &Vec<String>| !k.is_empty())
        .ok_or_else(|| ToolError::InvalidParams("Missing keywords parameter".to_string()))?;
    let limit = optional_usize(&params, "limit", 10);

    let results = search_by_keywords(&state.index, &state.collection, &keywords, limit)
        .await
        .map_err(|e| ToolError::Execution(e.to_string()))?;

    Ok(json!({
        "success": true,
        "count": results.len(),
        "results": results,
    }))
}

async fn handle_index<I: VectorIndex, S: KeyValueStore>(
    state: &State<I, S>,
    params: Value,
) -> Result<Value, ToolError> {
    let url = required_str(&params, "url")?;
    let library_name = required_str(&params, "library_name")?;

    let mut request = BulkIndexRequest::new(url, library_name);
    if let Some(version) = optional_str(&params, "version") {
        request.version = version;
    }
    if let Some(category) = optional_str(&params, "category") {
        request.category = category;
    }
    request.extract_content = optional_bool(&params, "extract_content");

    let report = state
        .indexer
        .bulk_index(&state.index, request)
        .await
        .map_err(|e| ToolError::Execution(e.to_string()))?;

    Ok(json!({
        "success": true,
        "message": format!(
            "Indexed {}/{} documentation URLs",
            report.successful.len(),
            report.total()
        ),
        "indexed": report.successful,
        "failed": report.failed,
    }))
}

async fn handle_extract_urls<I: VectorIndex, S: KeyValueStore>(
    state: &State<I, S>,
    params: Value,
) -> Result<Value, ToolError> {
    let url = required_str(&params, "url")?;
    let options = DocUrlOptions {
        max_urls: optional_usize(&params, "max_urls", DocUrlOptions::default().max_urls),
        ..Default::default()
    };

    let result = extract_documentation_urls(&state.fetcher, url, &options)
        .await
        .map_err(|e| ToolError::Execution(e.to_string()))?;

    Ok(json!({
        "success": true,
        "base_url": result.base_url,
        "total_found": result.total_found,
        "count": result.extracted_urls.len(),
        "urls": result.extracted_urls,
    }))
}

async fn handle_scrape_url<I: VectorIndex, S: KeyValueStore>(
    state: &State<I, S>,
    params: Value,
) -> Result<Value, ToolError> {
    let url = required_str(&params, "url")?;
    let html = state
        .fetcher
        .fetch(url)
        .await
        .map_err(|e| ToolError::Execution(e.to_string()))?;
    let content = extract_content(&html, url);

    Ok(json!({
        "success": true,
        "content": content,
    }))
}

async fn handle_check_url<I: VectorIndex, S: KeyValueStore>(
    state: &State<I, S>,
    params: Value,
) -> Result<Value, ToolError> {
    let url = required_str(&params, "url")?;
    let scrapeable = state.fetcher.is_scrapeable(url).await;

    Ok(json!({
        "success": true,
        "url": url,
        "scrapeable": scrapeable,
    }))
}

async fn handle_list<I: VectorIndex, S: KeyValueStore>(
    state: &State<I, S>,
    params: Value,
) -> Result<Value, ToolError> {
    let options = SearchOptions {
        limit: optional_usize(&params, "limit", 10),
        offset: optional_usize(&params, "offset", 0),
        filters: search_filters(&params),
        ..Default::default()
    };

    let listed = list_documents(&state.index, &state.collection, options)
        .await
        .map_err(|e| ToolError::Execution(e.to_string()))?;

    let documents: Vec<Value> = listed
        .ids
        .iter()
        .zip(&listed.metadatas)
        .map(|(id, metadata)| {
            json!({
                "id": id,
                "url": metadata.url,
                "title": metadata.title,
                "library_name": metadata.library_name,
                "version": metadata.version,
                "category": metadata.category,
                "section": metadata.section,
                "content_extracted": metadata.content_extracted,
            })
        })
        .collect();

    Ok(json!({
        "success": true,
        "count": documents.len(),
        "documents": documents,
    }))
}

async fn handle_get_parameter<I: VectorIndex, S: KeyValueStore>(
    state: &State<I, S>,
    params: Value,
) -> Result<Value, ToolError> {
    let name = required_str(&params, "name")?;
    let value = state
        .parameters
        .get(name)
        .await
        .map_err(|e| ToolError::Execution(e.to_string()))?;

    match value {
        Some(value) => Ok(json!({
            "success": true,
            "name": name,
            "value": value,
        })),
        None => Ok(json!({
            "success": false,
            "name": name,
            "message": format!("Parameter '{}' not found", name),
        })),
    }
}

async fn handle_set_parameter<I: VectorIndex, S: KeyValueStore>(
    state: &State<I, S>,
    params: Value,
) -> Result<Value, ToolError> {
    let name = required_str(&params, "name")?;
    let value = required_str(&params, "value")?;
    state
        .parameters
        .set(name, value)
        .await
        .map_err(|e| ToolError::Execution(e.to_string()))?;

    Ok(json!({
        "success": true,
        "message": format!("Parameter '{}' stored", name),
    }))
}

async fn handle_delete_parameter<I: VectorIndex, S: KeyValueStore>(
    state: &State<I, S>,
    params: Value,
) -> Result<Value, ToolError> {
    let name = required_str(&params, "name")?;
    let existed = state
        .parameters
        .delete(name)
        .await
        .map_err(|e| ToolError::Execution(e.to_string()))?;

    Ok(json!({
        "success": existed,
        "message": if existed {
            format!("Parameter '{}' deleted", name)
        } else {
            format!("Parameter '{}' not found", name)
        },
    }))
}

async fn handle_list_parameters<I: VectorIndex, S: KeyValueStore>(
    state: &State<I, S>,
) -> Result<Value, ToolError> {
    let names = state
        .parameters
        .list()
        .await
        .map_err(|e| ToolError::Execution(e.to_string()))?;

    Ok(json!({
        "success": true,
        "count": names.len(),
        "parameters": names,
    }))
}

const WEATHER_CONDITIONS: [&str; 5] = ["sunny", "cloudy", "rainy", "windy", "snowy"];

/// Mock weather derived deterministically from the location name
fn handle_get_weather(params: Value) -> Result<Value, ToolError> {
    let location = required_str(&params, "location")?;

    let seed: u64 = location
        .to_lowercase()
        .bytes()
        .fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));
    let condition = WEATHER_CONDITIONS[(seed % WEATHER_CONDITIONS.len() as u64) as usize];
    let temperature_c = (seed % 35) as i64 - 5;

    Ok(json!({
        "success": true,
        "location": location,
        "condition": condition,
        "temperature_c": temperature_c,
    }))
}
