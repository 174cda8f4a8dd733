//! Observability for the Shelf storefront.
//!
//! All crates in the workspace log through `tracing`; this crate installs
//! the global subscriber an embedding application uses.

mod logging;

pub use logging::*;

// Re-export the config types for convenience
pub use shelf_core::{LogFormat, LoggingConfig};
