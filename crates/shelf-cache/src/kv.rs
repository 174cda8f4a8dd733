//! Key-value store wrapper with automatic serialization.

use std::path::PathBuf;
use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};

use crate::backend::{Backend, FileBackend, MemoryBackend};
use crate::CacheError;

/// Type-safe cache over a [`Backend`].
///
/// Provides automatic JSON serialization for any type that implements
/// `Serialize` and `DeserializeOwned`. Cloning is cheap and clones share the
/// same underlying storage.
#[derive(Debug, Clone)]
pub struct Cache {
    backend: Arc<dyn Backend>,
}

impl Cache {
    /// Open a file-backed cache rooted at `dir`.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let cache = Cache::open(".shelf")?;
    /// ```
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, CacheError> {
        Ok(Self::with_backend(FileBackend::open(dir)?))
    }

    /// Create a cache that lives only in process memory.
    pub fn in_memory() -> Self {
        Self::with_backend(MemoryBackend::new())
    }

    /// Wrap an arbitrary backend.
    pub fn with_backend(backend: impl Backend + 'static) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }

    /// Get a value from the cache.
    ///
    /// Returns `None` if the key doesn't exist, and
    /// [`CacheError::SerializeError`] if it exists but doesn't parse as `T`.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let items: Option<Vec<CartItem>> = cache.get("bookstore.cart")?;
    /// ```
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        match self.backend.get(key)? {
            Some(bytes) => {
                let value: T = serde_json::from_slice(&bytes)?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// Set a value in the cache, replacing any previous value.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// cache.set("bookstore.cart", &items)?;
    /// ```
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), CacheError> {
        let bytes = serde_json::to_vec(value)?;
        self.backend.set(key, &bytes)
    }

    /// Get the raw stored bytes, bypassing deserialization.
    pub fn get_raw(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        self.backend.get(key)
    }

    /// Store raw bytes, bypassing serialization.
    pub fn set_raw(&self, key: &str, value: &[u8]) -> Result<(), CacheError> {
        self.backend.set(key, value)
    }

    /// Delete a value from the cache.
    pub fn delete(&self, key: &str) -> Result<(), CacheError> {
        tracing::debug!(key, "deleting cache key");
        self.backend.delete(key)
    }

    /// Check if a key exists in the cache.
    pub fn exists(&self, key: &str) -> Result<bool, CacheError> {
        self.backend.exists(key)
    }

    /// Get all keys in the cache.
    pub fn keys(&self) -> Result<Vec<String>, CacheError> {
        self.backend.keys()
    }
}
