//! Key-value persistence backends for the configuration store.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::error::StorageError;

/// Minimal string key-value store, one value per key.
pub trait Storage: Send + Sync {
    /// Read a value; `Ok(None)` when the key has never been written.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a key. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

impl<S: Storage + ?Sized> Storage for std::sync::Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

/// Stores each key as a file inside one directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Storage rooted at the platform config directory (`~/.config/deskglance` on Linux).
    pub fn default_location() -> Result<Self, StorageError> {
        Self::under(dirs::config_dir())
    }

    fn under(config_dir: Option<PathBuf>) -> Result<Self, StorageError> {
        let dir = config_dir.ok_or(StorageError::Unavailable)?;
        Ok(Self::new(dir.join("deskglance")))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

fn io_error(key: &str, source: std::io::Error) -> StorageError {
    StorageError::Io {
        key: key.to_string(),
        source,
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(key, e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| io_error(key, e))?;
        std::fs::write(self.path_for(key), value).map_err(|e| io_error(key, e))
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(key, e)),
        }
    }
}

/// In-process storage, used by tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(self, key: &str, value: &str) -> Self {
        self.entries.lock().insert(key.to_string(), value.to_string());
        self
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.lock().contains_key(key)
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_file_storage_roundtrip_creates_dir() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("nested"));

        assert_eq!(storage.get("config.toml").unwrap(), None);
        storage.set("config.toml", "a = 1").unwrap();
        assert_eq!(storage.get("config.toml").unwrap().as_deref(), Some("a = 1"));
    }

    #[test]
    fn test_file_storage_remove_missing_is_ok() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        storage.remove("ha_config").unwrap();

        storage.set("ha_config", "{}").unwrap();
        storage.remove("ha_config").unwrap();
        assert_eq!(storage.get("ha_config").unwrap(), None);
    }

    #[test]
    fn test_missing_config_dir_is_unavailable() {
        assert!(matches!(FileStorage::under(None), Err(StorageError::Unavailable)));

        let storage = FileStorage::under(Some(PathBuf::from("/home/user/.config"))).unwrap();
        assert_eq!(storage.dir(), Path::new("/home/user/.config/deskglance"));
    }

    #[test]
    fn test_memory_storage() {
        let storage = MemoryStorage::new().with_entry("k", "v");
        assert!(storage.contains("k"));
        storage.remove("k").unwrap();
        assert!(!storage.contains("k"));
    }
}
