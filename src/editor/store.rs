//! Key-value storage backends for the document text.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Errors raised by a storage backend
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// IO error (file system)
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The stored data could not be decoded
    #[error("Parse error: {0}")]
    Parse(String),

    /// The backend cannot be used at all
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Parse(format!("JSON: {}", err))
    }
}

/// A string key-value store, the local-storage equivalent.
pub trait KeyValueStore: Send + Sync + std::fmt::Debug {
    /// Read the value stored under `key`
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// A single stored value
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredEntry {
    value: String,
    saved_at: DateTime<Utc>,
}

/// On-disk layout of a [`FileStore`]
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    #[serde(default)]
    entries: BTreeMap<String, StoredEntry>,
}

/// JSON file backed store.
///
/// Every write rewrites the whole file through a temporary file in the same
/// directory, so a crash never leaves a truncated store behind.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    /// Create a store backed by the given file (created on first write)
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Default store location in the user's data directory
    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("hyperdoc")
            .join("storage.json")
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_file(&self) -> Result<StoreFile, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(StoreFile::default()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(StoreFile::default()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_file(&self, file: &StoreFile) -> Result<(), StoreError> {
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&parent)?;
        let json = serde_json::to_string_pretty(file)?;
        tmp.write_all(json.as_bytes())?;
        tmp.flush()?;
        tmp.persist(&self.path).map_err(|e| StoreError::Io(e.error))?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let file = self.read_file()?;
        Ok(file.entries.get(key).map(|entry| entry.value.clone()))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        // A corrupt file is replaced rather than blocking every future save.
        let mut file = match self.read_file() {
            Ok(file) => file,
            Err(StoreError::Parse(msg)) => {
                tracing::warn!("Discarding unreadable store {}: {}", self.path.display(), msg);
                StoreFile::default()
            }
            Err(e) => return Err(e),
        };
        file.entries.insert(
            key.to_string(),
            StoredEntry {
                value: value.to_string(),
                saved_at: Utc::now(),
            },
        );
        self.write_file(&file)
    }
}

/// In-memory store, lost when the process exits
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let guard = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Ok(guard.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut guard = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        guard.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// A store whose every operation fails, like storage disabled by the host
#[derive(Debug, Clone)]
pub struct UnavailableStore {
    reason: String,
}

impl UnavailableStore {
    /// Create a store that fails with the given reason
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl KeyValueStore for UnavailableStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError::Unavailable(self.reason.clone()))
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable(self.reason.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested").join("storage.json"));

        assert_eq!(store.get("doc").unwrap(), None);
        store.set("doc", "line one\n\nline two").unwrap();
        assert_eq!(
            store.get("doc").unwrap(),
            Some("line one\n\nline two".to_string())
        );
    }

    #[test]
    fn test_file_store_keeps_other_keys() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().join("storage.json"));

        store.set("a", "1").unwrap();
        store.set("b", "2").unwrap();
        store.set("a", "3").unwrap();

        assert_eq!(store.get("a").unwrap(), Some("3".to_string()));
        assert_eq!(store.get("b").unwrap(), Some("2".to_string()));
    }

    #[test]
    fn test_file_store_corrupt_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(&path, "{not json").unwrap();

        let store = FileStore::new(&path);
        assert!(matches!(store.get("doc"), Err(StoreError::Parse(_))));

        // Writing replaces the corrupt file
        store.set("doc", "fresh").unwrap();
        assert_eq!(store.get("doc").unwrap(), Some("fresh".to_string()));
    }

    #[test]
    fn test_file_store_empty_string_value() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().join("storage.json"));
        store.set("doc", "").unwrap();
        assert_eq!(store.get("doc").unwrap(), Some(String::new()));
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        assert_eq!(store.get("k").unwrap(), None);
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap(), Some("v".to_string()));
    }

    #[test]
    fn test_unavailable_store() {
        let store = UnavailableStore::new("disabled");
        assert!(matches!(store.get("k"), Err(StoreError::Unavailable(_))));
        assert!(store.set("k", "v").is_err());
    }
}
