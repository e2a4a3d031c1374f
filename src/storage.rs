use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    /// The backing store is out of space. Callers keep in-memory state
    /// and surface a warning; the session stays usable.
    #[error("storage quota exceeded")]
    QuotaExceeded,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Keys used by the application state.
pub mod keys {
    pub const CHARACTERS: &str = "characters";
    pub const CHARACTER_STATS: &str = "character_stats";
    pub const ACTIVE_CHARACTER: &str = "active_character";
    pub const DAYS_COUNT: &str = "days_count";
    pub const DIALOG_LOGS: &str = "dialog_logs";
}

/// Opaque key/value persistence with last-write-wins semantics.
pub trait KvStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// File-backed store: one JSON file per key under a data directory.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: PathBuf) -> Result<Self, StorageError> {
        std::fs::create_dir_all(&dir)?;
        Ok(FileStore { dir })
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KvStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(self.path(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        std::fs::write(self.path(key), value).map_err(|e| {
            if e.kind() == ErrorKind::StorageFull {
                StorageError::QuotaExceeded
            } else {
                StorageError::Io(e)
            }
        })
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        match std::fs::remove_file(self.path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory store for tests, with an optional byte quota per value so
/// quota-exceeded handling can be exercised.
#[derive(Default)]
pub struct MemStore {
    map: HashMap<String, String>,
    quota: Option<usize>,
}

impl MemStore {
    pub fn new() -> Self {
        MemStore::default()
    }

    pub fn with_quota(quota: usize) -> Self {
        MemStore {
            map: HashMap::new(),
            quota: Some(quota),
        }
    }
}

impl KvStore for MemStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.map.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if let Some(quota) = self.quota {
            if value.len() > quota {
                return Err(StorageError::QuotaExceeded);
            }
        }
        self.map.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.map.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mem_store_roundtrip() {
        let mut store = MemStore::new();
        assert!(store.get("k").unwrap().is_none());

        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));

        store.remove("k").unwrap();
        assert!(store.get("k").unwrap().is_none());
    }

    #[test]
    fn test_mem_store_quota() {
        let mut store = MemStore::with_quota(3);
        store.set("k", "ok").unwrap();
        assert!(matches!(
            store.set("k", "too long"),
            Err(StorageError::QuotaExceeded)
        ));
        // The previous value survives a failed write.
        assert_eq!(store.get("k").unwrap().as_deref(), Some("ok"));
    }

    #[test]
    fn test_file_store_missing_key_is_none() {
        let dir = std::env::temp_dir().join(format!("aipet-test-{}", uuid::Uuid::new_v4()));
        let mut store = FileStore::new(dir.clone()).unwrap();

        assert!(store.get("nothing").unwrap().is_none());
        store.set("k", "{}").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("{}"));
        store.remove("k").unwrap();
        store.remove("k").unwrap();
        assert!(store.get("k").unwrap().is_none());

        std::fs::remove_dir_all(dir).unwrap();
    }
}
