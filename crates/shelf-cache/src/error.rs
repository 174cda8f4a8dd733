//! Cache error types.

use thiserror::Error;

/// Errors that can occur when using the cache.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Failed to open the store.
    #[error("Failed to open store: {0}")]
    OpenError(String),

    /// Stored value could not be serialized or parsed.
    #[error("Serialization error: {0}")]
    SerializeError(#[from] serde_json::Error),

    /// Failed to perform store operation.
    #[error("Store operation failed: {0}")]
    StoreError(String),

    /// Key is not usable as a storage key.
    #[error("Invalid key: {0}")]
    InvalidKey(String),
}

impl CacheError {
    /// True when the stored bytes exist but are not a valid document.
    pub fn is_corrupt(&self) -> bool {
        matches!(self, CacheError::SerializeError(_))
    }
}
