//! Durable key-value storage areas
//!
//! The browser gives the extension two storage areas (synced settings, local
//! dismissals); this module abstracts them so the same stores run against an
//! in-memory map in tests, the wasm bridge's JS-backed area, or a JSON file
//! when the engine runs as a native host. Individual operations are assumed
//! atomic; there is no cross-operation transaction.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use serde_json::{Map, Value};

/// Error type for storage backends.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Storage record is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// A flat key-value area holding JSON values.
pub trait StorageArea: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Value>, StorageError>;
    fn set(&self, key: &str, value: Value) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
    fn keys(&self) -> Result<Vec<String>, StorageError>;

    /// Remove every key starting with `prefix`; returns the count removed.
    fn remove_prefixed(&self, prefix: &str) -> Result<usize, StorageError> {
        let matching: Vec<String> = self
            .keys()?
            .into_iter()
            .filter(|k| k.starts_with(prefix))
            .collect();
        for key in &matching {
            self.remove(key)?;
        }
        Ok(matching.len())
    }
}

// =============================================================================
// In-memory area
// =============================================================================

/// Volatile area for tests and embedders that persist elsewhere.
#[derive(Debug, Default)]
pub struct MemoryArea {
    entries: RwLock<HashMap<String, Value>>,
}

impl MemoryArea {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageArea for MemoryArea {
    fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        Ok(self.entries.read().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<(), StorageError> {
        self.entries.write().unwrap().insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.write().unwrap().remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.entries.read().unwrap().keys().cloned().collect())
    }
}

// =============================================================================
// JSON file area
// =============================================================================

/// One JSON object per file, read-modify-written on every operation.
///
/// Stands in for the browser's per-profile storage when the engine runs as a
/// command-line or native-messaging host. Throughput is irrelevant at this
/// record count; simplicity and a human-editable file win.
#[derive(Debug)]
pub struct JsonFileArea {
    path: PathBuf,
}

impl JsonFileArea {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_map(&self) -> Result<Map<String, Value>, StorageError> {
        match std::fs::read(&self.path) {
            Ok(bytes) => {
                let value: Value = serde_json::from_slice(&bytes)?;
                match value {
                    Value::Object(map) => Ok(map),
                    _ => Ok(Map::new()),
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Map::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_map(&self, map: &Map<String, Value>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let bytes = serde_json::to_vec_pretty(&Value::Object(map.clone()))?;
        std::fs::write(&self.path, bytes)?;
        Ok(())
    }
}

impl StorageArea for JsonFileArea {
    fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        Ok(self.read_map()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<(), StorageError> {
        let mut map = self.read_map()?;
        map.insert(key.to_string(), value);
        self.write_map(&map)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut map = self.read_map()?;
        if map.remove(key).is_some() {
            self.write_map(&map)?;
        }
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.read_map()?.keys().cloned().collect())
    }

    fn remove_prefixed(&self, prefix: &str) -> Result<usize, StorageError> {
        let mut map = self.read_map()?;
        let before = map.len();
        map.retain(|k, _| !k.starts_with(prefix));
        let removed = before - map.len();
        if removed > 0 {
            self.write_map(&map)?;
        }
        Ok(removed)
    }
}
