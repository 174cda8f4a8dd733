//! Book catalog module.
//!
//! Contains the book type served by the backend and the browse-page
//! filter and sort pipeline.

mod book;
mod query;

pub use book::{Book, GENRES};
pub use query::{CatalogQuery, SortOption};
