//! Key-value store boundary
//!
//! Small configuration parameters (API keys, per-user settings, feature
//! switches) live in an external key-value table rather than the vector
//! index. The store is abstract so the CLI and tests can run against an
//! in-process map.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

/// Errors that can occur during key-value operations
#[derive(Debug, Error)]
pub enum KvError {
    /// The requested table does not exist
    #[error("Unknown table: {0}")]
    UnknownTable(String),

    /// Failure from the backing store
    #[error("Store error: {0}")]
    Store(String),

    /// The stored value did not have the expected shape
    #[error("Malformed item: {0}")]
    MalformedItem(String),
}

/// Abstract contract for the key-value collaborator
pub trait KeyValueStore {
    /// Fetch one item by key, `None` when absent
    fn get_item(
        &self,
        table: &str,
        key: &str,
    ) -> impl std::future::Future<Output = Result<Option<Value>, KvError>> + Send;

    /// Write one item under a key, replacing any existing value
    fn put_item(
        &self,
        table: &str,
        key: &str,
        item: Value,
    ) -> impl std::future::Future<Output = Result<(), KvError>> + Send;

    /// Delete one item; returns whether it existed
    fn delete_item(
        &self,
        table: &str,
        key: &str,
    ) -> impl std::future::Future<Output = Result<bool, KvError>> + Send;

    /// Merge top-level fields into an existing item; returns whether it existed
    fn update_item(
        &self,
        table: &str,
        key: &str,
        updates: Value,
    ) -> impl std::future::Future<Output = Result<bool, KvError>> + Send;

    /// Fetch every item whose `field` equals `value`
    fn query(
        &self,
        table: &str,
        field: &str,
        value: &Value,
    ) -> impl std::future::Future<Output = Result<Vec<Value>, KvError>> + Send;

    /// Fetch every item in a table
    fn scan(
        &self,
        table: &str,
    ) -> impl std::future::Future<Output = Result<Vec<Value>, KvError>> + Send;

    /// List every key in a table, sorted
    fn list_keys(
        &self,
        table: &str,
    ) -> impl std::future::Future<Output = Result<Vec<String>, KvError>> + Send;

    /// List every table name, sorted
    fn list_tables(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<String>, KvError>> + Send;
}

/// In-memory key-value store used by tests and the CLI
#[derive(Debug, Clone, Default)]
pub struct MemoryKvStore {
    tables: Arc<RwLock<HashMap<String, HashMap<String, Value>>>>,
}

impl MemoryKvStore {
    /// Create a new, empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKvStore {
    async fn get_item(&self, table: &str, key: &str) -> Result<Option<Value>, KvError> {
        let tables = self.tables.read().await;
        Ok(tables.get(table).and_then(|t| t.get(key)).cloned())
    }

    async fn put_item(&self, table: &str, key: &str, item: Value) -> Result<(), KvError> {
        let mut tables = self.tables.write().await;
        tables
            .entry(table.to_string())
            .or_default()
            .insert(key.to_string(), item);
        debug!("Stored item '{}' in table '{}'", key, table);
        Ok(())
    }

    async fn delete_item(&self, table: &str, key: &str) -> Result<bool, KvError> {
        let mut tables = self.tables.write().await;
        Ok(tables
            .get_mut(table)
            .is_some_and(|t| t.remove(key).is_some()))
    }

    async fn update_item(&self, table: &str, key: &str, updates: Value) -> Result<bool, KvError> {
        let mut tables = self.tables.write().await;
        let Some(item) = tables.get_mut(table).and_then(|t| t.get_mut(key)) else {
            return Ok(false);
        };

        match (item.as_object_mut(), updates.as_object()) {
            (Some(existing), Some(updates)) => {
                for (field, value) in updates {
                    existing.insert(field.clone(), value.clone());
                }
                Ok(true)
            }
            _ => Err(KvError::MalformedItem(format!(
                "item '{}' and updates must both be objects",
                key
            ))),
        }
    }

    async fn query(&self, table: &str, field: &str, value: &Value) -> Result<Vec<Value>, KvError> {
        let tables = self.tables.read().await;
        Ok(tables
            .get(table)
            .map(|t| {
                t.values()
                    .filter(|item| item.get(field) == Some(value))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn scan(&self, table: &str) -> Result<Vec<Value>, KvError> {
        let tables = self.tables.read().await;
        Ok(tables
            .get(table)
            .map(|t| t.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn list_keys(&self, table: &str) -> Result<Vec<String>, KvError> {
        let tables = self.tables.read().await;
        let mut keys: Vec<String> = tables
            .get(table)
            .map(|t| t.keys().cloned().collect())
            .unwrap_or_default();
        keys.sort();
        Ok(keys)
    }

    async fn list_tables(&self) -> Result<Vec<String>, KvError> {
        let tables = self.tables.read().await;
        let mut names: Vec<String> = tables.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}

/// Table holding configuration parameters
pub const PARAMETER_TABLE: &str = "parameters";

/// Typed parameter access over a key-value store
///
/// Parameters are stored as `{"name": ..., "value": ...}` items keyed by
/// name.
#[derive(Debug, Clone)]
pub struct ParameterStore<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> ParameterStore<S> {
    /// Create a parameter store over the given backend
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Fetch a parameter value by name
    pub async fn get(&self, name: &str) -> Result<Option<String>, KvError> {
        let Some(item) = self.store.get_item(PARAMETER_TABLE, name).await? else {
            return Ok(None);
        };
        let value = item
            .get("value")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                KvError::MalformedItem(format!("parameter '{}' has no string value", name))
            })?;
        Ok(Some(value.to_string()))
    }

    /// Set a parameter, replacing any existing value
    pub async fn set(&self, name: &str, value: &str) -> Result<(), KvError> {
        let item = serde_json::json!({ "name": name, "value": value });
        self.store.put_item(PARAMETER_TABLE, name, item).await
    }

    /// Delete a parameter; returns whether it existed
    pub async fn delete(&self, name: &str) -> Result<bool, KvError> {
        self.store.delete_item(PARAMETER_TABLE, name).await
    }

    /// List all parameter names, sorted
    pub async fn list(&self) -> Result<Vec<String>, KvError> {
        self.store.list_keys(PARAMETER_TABLE).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_put_get_delete_roundtrip() {
        let store = MemoryKvStore::new();
        store
            .put_item("settings", "theme", json!({"value": "dark"}))
            .await
            .unwrap();

        let item = store.get_item("settings", "theme").await.unwrap().unwrap();
        assert_eq!(item["value"], "dark");

        assert!(store.delete_item("settings", "theme").await.unwrap());
        assert!(!store.delete_item("settings", "theme").await.unwrap());
        assert!(store.get_item("settings", "theme").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_item_merges_fields() {
        let store = MemoryKvStore::new();
        store
            .put_item("settings", "theme", json!({"value": "dark", "locked": false}))
            .await
            .unwrap();

        let updated = store
            .update_item("settings", "theme", json!({"value": "light"}))
            .await
            .unwrap();
        assert!(updated);

        let item = store.get_item("settings", "theme").await.unwrap().unwrap();
        assert_eq!(item["value"], "light");
        assert_eq!(item["locked"], false);

        let missing = store
            .update_item("settings", "absent", json!({"value": "x"}))
            .await
            .unwrap();
        assert!(!missing);
    }

    #[tokio::test]
    async fn test_query_by_field_equality() {
        let store = MemoryKvStore::new();
        store
            .put_item("users", "a", json!({"role": "admin", "name": "a"}))
            .await
            .unwrap();
        store
            .put_item("users", "b", json!({"role": "viewer", "name": "b"}))
            .await
            .unwrap();

        let admins = store
            .query("users", "role", &json!("admin"))
            .await
            .unwrap();
        assert_eq!(admins.len(), 1);
        assert_eq!(admins[0]["name"], "a");

        assert_eq!(store.scan("users").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_list_tables_sorted() {
        let store = MemoryKvStore::new();
        store.put_item("beta", "k", json!(1)).await.unwrap();
        store.put_item("alpha", "k", json!(1)).await.unwrap();
        assert_eq!(store.list_tables().await.unwrap(), vec!["alpha", "beta"]);
    }

    #[tokio::test]
    async fn test_list_keys_sorted() {
        let store = MemoryKvStore::new();
        store.put_item("t", "b", json!(1)).await.unwrap();
        store.put_item("t", "a", json!(2)).await.unwrap();

        assert_eq!(store.list_keys("t").await.unwrap(), vec!["a", "b"]);
        assert!(store.list_keys("missing").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_parameter_store() {
        let params = ParameterStore::new(MemoryKvStore::new());

        assert!(params.get("api_key").await.unwrap().is_none());
        params.set("api_key", "secret").await.unwrap();
        assert_eq!(params.get("api_key").await.unwrap().unwrap(), "secret");

        params.set("region", "us-east-1").await.unwrap();
        assert_eq!(params.list().await.unwrap(), vec!["api_key", "region"]);

        assert!(params.delete("api_key").await.unwrap());
        assert!(params.get("api_key").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_malformed_parameter_rejected() {
        let store = MemoryKvStore::new();
        store
            .put_item(PARAMETER_TABLE, "broken", json!({"name": "broken"}))
            .await
            .unwrap();

        let params = ParameterStore::new(store);
        assert!(matches!(
            params.get("broken").await,
            Err(KvError::MalformedItem(_))
        ));
    }
}
