//! Core configuration for the Shelf bookstore storefront.
//!
//! This crate provides:
//! - `StorefrontConfig` - Top-level configuration, loaded from TOML or JSON
//! - Per-concern sections: API, storage, pricing, checkout, logging

mod config;

pub use config::*;
