//! REST client plumbing for the storefront backend.
//!
//! This crate provides:
//! - `ApiClient` - JSON-over-HTTP client bound to a base URL
//! - `FetchError` - Failure taxonomy separating HTTP status errors from
//!   transport errors
//! - `TimeoutConfig` - Connect and total request timeouts

mod client;
mod timeout;

pub use client::*;
pub use timeout::*;
