//! Raw byte storage backends.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::CacheError;

/// A byte-oriented key-value store.
///
/// Writes replace the whole value; there are no partial updates.
pub trait Backend: fmt::Debug + Send + Sync {
    /// Read the bytes stored under `key`.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// Replace the bytes stored under `key`.
    fn set(&self, key: &str, value: &[u8]) -> Result<(), CacheError>;

    /// Remove `key`. Removing a missing key is not an error.
    fn delete(&self, key: &str) -> Result<(), CacheError>;

    /// Check whether `key` holds a value.
    fn exists(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.get(key)?.is_some())
    }

    /// List every stored key.
    fn keys(&self) -> Result<Vec<String>, CacheError>;
}

/// Backend that keeps one file per key inside a directory.
///
/// Values are written to a temporary file and renamed into place, so a
/// crash mid-write leaves the previous value intact.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

const FILE_SUFFIX: &str = ".json";
const TMP_SUFFIX: &str = ".tmp";

impl FileBackend {
    /// Open (and create if needed) a storage directory.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .map_err(|e| CacheError::OpenError(format!("{}: {}", dir.display(), e)))?;
        Ok(Self { dir })
    }

    /// The storage directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, CacheError> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{key}{FILE_SUFFIX}")))
    }
}

impl Backend for FileBackend {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let path = self.path_for(key)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CacheError::StoreError(format!("read {key}: {e}"))),
        }
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), CacheError> {
        let path = self.path_for(key)?;
        let tmp = self.dir.join(format!("{key}{TMP_SUFFIX}"));
        fs::write(&tmp, value)
            .map_err(|e| CacheError::StoreError(format!("write {key}: {e}")))?;
        fs::rename(&tmp, &path)
            .map_err(|e| CacheError::StoreError(format!("replace {key}: {e}")))
    }

    fn delete(&self, key: &str) -> Result<(), CacheError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CacheError::StoreError(format!("delete {key}: {e}"))),
        }
    }

    fn exists(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.path_for(key)?.is_file())
    }

    fn keys(&self) -> Result<Vec<String>, CacheError> {
        let entries = fs::read_dir(&self.dir)
            .map_err(|e| CacheError::StoreError(format!("list {}: {}", self.dir.display(), e)))?;

        let mut keys = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| CacheError::StoreError(e.to_string()))?;
            let name = entry.file_name();
            if let Some(key) = name.to_str().and_then(|n| n.strip_suffix(FILE_SUFFIX)) {
                keys.push(key.to_string());
            }
        }
        keys.sort();
        Ok(keys)
    }
}

/// Keys become file names, so they must not escape the directory.
fn validate_key(key: &str) -> Result<(), CacheError> {
    let bad = key.is_empty()
        || key.starts_with('.')
        || key.contains(['/', '\\'])
        || key.chars().any(char::is_control);
    if bad {
        return Err(CacheError::InvalidKey(key.to_string()));
    }
    Ok(())
}

/// Backend that keeps everything in process memory.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryBackend {
    /// Create an empty in-memory backend.
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> CacheError {
    CacheError::StoreError("memory store lock poisoned".to_string())
}

impl Backend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let entries = self.entries.read().map_err(poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), CacheError> {
        let mut entries = self.entries.write().map_err(poisoned)?;
        entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut entries = self.entries.write().map_err(poisoned)?;
        entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, CacheError> {
        let entries = self.entries.read().map_err(poisoned)?;
        let mut keys: Vec<String> = entries.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}
