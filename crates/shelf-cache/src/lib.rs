//! Durable local key-value storage for the Shelf storefront.
//!
//! Plays the role a browser's local storage plays for a web client: a small
//! set of fixed keys, each holding one JSON document that is overwritten
//! wholesale.
//!
//! # Example
//!
//! ```rust,ignore
//! use shelf_cache::Cache;
//!
//! let cache = Cache::open(".shelf")?;
//!
//! // Store a value
//! cache.set("bookstore.cart", &items)?;
//!
//! // Retrieve a value
//! let items: Option<Vec<CartItem>> = cache.get("bookstore.cart")?;
//!
//! // Delete a value
//! cache.delete("bookstore.cart")?;
//! ```

mod backend;
mod error;
mod kv;

pub use backend::{Backend, FileBackend, MemoryBackend};
pub use error::CacheError;
pub use kv::Cache;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{Backend, Cache, CacheError};
}
