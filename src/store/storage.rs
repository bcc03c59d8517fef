//! String key/value persistence backends.
//!
//! The result store only needs what browser local storage offers: string
//! values under string keys. Anything else may read or rewrite the
//! underlying data at any time, so backends never assume they own it.

use crate::store::StoreError;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// A string key/value store.
pub trait Storage: Send + Sync {
    /// Read the value stored under `key`.
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Store several entries at once.
    ///
    /// Backends that can write all entries in one operation override this.
    fn set_items(&self, entries: &[(&str, &str)]) -> Result<(), StoreError> {
        for (key, value) in entries {
            self.set_item(key, value)?;
        }
        Ok(())
    }
}

/// In-process storage. Contents are lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop a key, as an external actor clearing storage would.
    #[cfg(test)]
    pub fn remove_item(&self, key: &str) {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        let items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.set_items(&[(key, value)])
    }

    fn set_items(&self, entries: &[(&str, &str)]) -> Result<(), StoreError> {
        let mut items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        for (key, value) in entries {
            items.insert((*key).to_string(), (*value).to_string());
        }
        Ok(())
    }
}

/// Storage backed by a single JSON object file on disk.
///
/// Every write replaces the file through a temporary file and a rename, so
/// a reader sees either the old contents or the new ones.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the whole key/value map. A missing file is empty; a file that is
    /// not a JSON object of strings is treated as empty too.
    fn load(&self) -> Result<BTreeMap<String, String>, StoreError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Storage file {} does not exist yet", self.path.display());
                return Ok(BTreeMap::new());
            }
            Err(e) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source: e,
                })
            }
        };

        match serde_json::from_str(&content) {
            Ok(items) => Ok(items),
            Err(e) => {
                warn!(
                    "Ignoring unreadable storage file {}: {}",
                    self.path.display(),
                    e
                );
                Ok(BTreeMap::new())
            }
        }
    }

    fn save(&self, items: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let io_err = |source: std::io::Error| StoreError::Io {
            path: self.path.clone(),
            source,
        };

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir).map_err(io_err)?;

        let serialized = serde_json::to_string_pretty(items)?;
        let mut tmp = NamedTempFile::new_in(&dir).map_err(io_err)?;
        tmp.write_all(serialized.as_bytes()).map_err(io_err)?;
        tmp.persist(&self.path).map_err(|e| io_err(e.error))?;

        debug!("Wrote {} keys to {}", items.len(), self.path.display());
        Ok(())
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.load()?.remove(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.set_items(&[(key, value)])
    }

    fn set_items(&self, entries: &[(&str, &str)]) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut items = self.load()?;
        for (key, value) in entries {
            items.insert((*key).to_string(), (*value).to_string());
        }
        self.save(&items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_storage_set_and_get() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get_item("k").unwrap(), None);

        storage.set_item("k", "v1").unwrap();
        storage.set_item("k", "v2").unwrap();
        assert_eq!(storage.get_item("k").unwrap().as_deref(), Some("v2"));

        storage.remove_item("k");
        assert_eq!(storage.get_item("k").unwrap(), None);
    }

    #[test]
    fn test_file_storage_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path().join("nested").join("storage.json"));
        assert_eq!(storage.get_item("anything").unwrap(), None);
    }

    #[test]
    fn test_file_storage_persists_across_instances() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state").join("storage.json");

        let first = FileStorage::new(&path);
        first.set_items(&[("a", "1"), ("b", "2")]).unwrap();

        let second = FileStorage::new(&path);
        assert_eq!(second.get_item("a").unwrap().as_deref(), Some("1"));
        assert_eq!(second.get_item("b").unwrap().as_deref(), Some("2"));
        assert_eq!(second.path(), path.as_path());
    }

    #[test]
    fn test_file_storage_corrupt_file_reads_empty_and_recovers() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "{{ definitely not json").unwrap();

        let storage = FileStorage::new(&path);
        assert_eq!(storage.get_item("a").unwrap(), None);

        storage.set_item("a", "fresh").unwrap();
        assert_eq!(storage.get_item("a").unwrap().as_deref(), Some("fresh"));
    }
}
