//! Flat key/value store the adapters persist their state into

use crate::{prelude::HashMap, MapError, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Opaque blob store scoped by string keys
pub trait StateStore: Send + Sync {
    fn save(&self, key: &str, value: Value) -> Result<()>;

    fn load(&self, key: &str) -> Result<Option<Value>>;

    fn load_or(&self, key: &str, default: Value) -> Result<Value> {
        Ok(self.load(key)?.unwrap_or(default))
    }
}

/// Store that lives as long as the process
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.lock().map(|v| v.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl StateStore for MemoryStore {
    fn save(&self, key: &str, value: Value) -> Result<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| MapError::Store("memory store lock poisoned".to_string()))?;
        values.insert(key.to_string(), value);
        Ok(())
    }

    fn load(&self, key: &str) -> Result<Option<Value>> {
        let values = self
            .values
            .lock()
            .map_err(|_| MapError::Store("memory store lock poisoned".to_string()))?;
        Ok(values.get(key).cloned())
    }
}

/// Store backed by a single JSON object file, rewritten on every save
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: Mutex<serde_json::Map<String, Value>>,
}

impl JsonFileStore {
    /// Opens the store, reading the file if it already exists
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let values = if path.exists() {
            let text = std::fs::read_to_string(&path)?;
            match serde_json::from_str::<Value>(&text)? {
                Value::Object(map) => map,
                other => {
                    return Err(MapError::Store(format!(
                        "{} does not hold a JSON object: {}",
                        path.display(),
                        other
                    )))
                }
            }
        } else {
            serde_json::Map::new()
        };

        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateStore for JsonFileStore {
    fn save(&self, key: &str, value: Value) -> Result<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| MapError::Store("file store lock poisoned".to_string()))?;
        values.insert(key.to_string(), value);
        let text = serde_json::to_string_pretty(&*values)?;
        std::fs::write(&self.path, text)?;
        log::debug!("saved {} to {}", key, self.path.display());
        Ok(())
    }

    fn load(&self, key: &str) -> Result<Option<Value>> {
        let values = self
            .values
            .lock()
            .map_err(|_| MapError::Store("file store lock poisoned".to_string()))?;
        Ok(values.get(key).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryStore::new();
        assert!(store.load("a").unwrap().is_none());
        assert_eq!(store.load_or("a", json!(1)).unwrap(), json!(1));

        store.save("a", json!({ "zoom": 3 })).unwrap();
        assert_eq!(store.load("a").unwrap(), Some(json!({ "zoom": 3 })));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_file_store_persists_between_opens() {
        let path = std::env::temp_dir().join(format!(
            "trackmap-store-test-{}.json",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);

        {
            let store = JsonFileStore::open(&path).unwrap();
            store.save("mapState-main", json!({ "zoom": 9 })).unwrap();
        }

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(
            reopened.load("mapState-main").unwrap(),
            Some(json!({ "zoom": 9 }))
        );
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_file_store_rejects_non_object() {
        let path = std::env::temp_dir().join(format!(
            "trackmap-store-bad-{}.json",
            std::process::id()
        ));
        std::fs::write(&path, "[1, 2]").unwrap();
        assert!(matches!(JsonFileStore::open(&path), Err(MapError::Store(_))));
        std::fs::remove_file(&path).unwrap();
    }
}
