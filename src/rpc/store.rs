//! JSON key/value store backing the `store_*` RPC functions.

use super::JsonMap;
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// A JSON object persisted to one file after every write.
#[derive(Debug)]
pub struct JsonStore {
    path: PathBuf,
    values: Mutex<JsonMap>,
}

impl JsonStore {
    /// Loads the store at `path`. A missing file starts empty.
    pub fn load(path: &Path) -> Result<Self> {
        let values = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read store file: {}", path.display()))?;
            if content.trim().is_empty() {
                JsonMap::new()
            } else {
                match serde_json::from_str::<Value>(&content)
                    .with_context(|| format!("Failed to parse store file: {}", path.display()))?
                {
                    Value::Object(map) => map,
                    _ => anyhow::bail!("Store file is not a JSON object: {}", path.display()),
                }
            }
        } else {
            JsonMap::new()
        };
        Ok(Self {
            path: path.to_path_buf(),
            values: Mutex::new(values),
        })
    }

    pub async fn get(&self, key: &str) -> Option<Value> {
        self.values.lock().await.get(key).cloned()
    }

    pub async fn keys(&self) -> Vec<String> {
        self.values.lock().await.keys().cloned().collect()
    }

    /// Stores `value` under `key` and writes the whole store back to disk.
    ///
    /// The in-memory map changes only once the write succeeds.
    pub async fn set(&self, key: &str, value: Value) -> Result<()> {
        let mut values = self.values.lock().await;
        let mut updated = values.clone();
        updated.insert(key.to_string(), value);
        let content =
            serde_json::to_string_pretty(&updated).context("Failed to serialize store")?;
        tokio::fs::write(&self.path, content)
            .await
            .with_context(|| format!("Failed to write store file: {}", self.path.display()))?;
        *values = updated;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_failed_write_leaves_store_unchanged() {
        let temp = TempDir::new().unwrap();
        let store = JsonStore::load(&temp.path().join("missing_dir").join("store.json")).unwrap();

        assert!(store.set("k", json!(1)).await.is_err());
        assert_eq!(store.get("k").await, None);
        assert!(store.keys().await.is_empty());
    }

    #[tokio::test]
    async fn test_set_overwrites_existing_key() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("store.json");
        let store = JsonStore::load(&path).unwrap();

        store.set("k", json!("old")).await.unwrap();
        store.set("k", json!("new")).await.unwrap();

        assert_eq!(store.get("k").await, Some(json!("new")));
        let reloaded = JsonStore::load(&path).unwrap();
        assert_eq!(reloaded.keys().await, vec!["k".to_string()]);
    }
}
