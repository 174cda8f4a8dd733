//! Storefront configuration.
//!
//! Every section and field has a default, so an empty file is a valid
//! configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Storefront configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorefrontConfig {
    /// Backend API connection.
    #[serde(default)]
    pub api: ApiConfig,

    /// Local durable storage.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Cart limits.
    #[serde(default)]
    pub cart: CartConfig,

    /// Cart pricing rules.
    #[serde(default)]
    pub pricing: PricingConfig,

    /// Checkout settings.
    #[serde(default)]
    pub checkout: CheckoutConfig,

    /// Logging output.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl StorefrontConfig {
    /// Load config from a file.
    ///
    /// Files ending in `.json` are parsed as JSON, anything else as TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        if is_json(path) {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display()))
        }
    }

    /// Save config to a file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = if is_json(path) {
            serde_json::to_string_pretty(self)?
        } else {
            toml::to_string_pretty(self)?
        };

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "json")
}

/// Backend REST API settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL that endpoint paths are appended to.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Total request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Bearer token attached to every request, if the session has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bearer_token: Option<String>,
}

fn default_base_url() -> String {
    "http://localhost:8080/bookstore/api".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
            bearer_token: None,
        }
    }
}

/// Local durable storage settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding one file per storage key.
    #[serde(default = "default_storage_dir")]
    pub dir: PathBuf,

    /// Key of the cart snapshot.
    #[serde(default = "default_cart_key")]
    pub cart_key: String,

    /// Key of the fallback order ledger.
    #[serde(default = "default_orders_key")]
    pub orders_key: String,
}

fn default_storage_dir() -> PathBuf {
    PathBuf::from(".shelf")
}

fn default_cart_key() -> String {
    "bookstore.cart".to_string()
}

fn default_orders_key() -> String {
    "bookstore.orders".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: default_storage_dir(),
            cart_key: default_cart_key(),
            orders_key: default_orders_key(),
        }
    }
}

/// Cart pricing rules.
///
/// Amounts are in major currency units (e.g. rand, not cents).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Student discount applied to customer carts, in percent.
    #[serde(default = "default_discount_percent")]
    pub student_discount_percent: u32,

    /// Discounted total at or above which shipping is free.
    #[serde(default = "default_free_shipping_threshold")]
    pub free_shipping_threshold: f64,

    /// Shipping charged below the threshold.
    #[serde(default = "default_flat_shipping")]
    pub flat_shipping: f64,
}

fn default_discount_percent() -> u32 {
    5
}

fn default_free_shipping_threshold() -> f64 {
    500.0
}

fn default_flat_shipping() -> f64 {
    50.0
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            student_discount_percent: default_discount_percent(),
            free_shipping_threshold: default_free_shipping_threshold(),
            flat_shipping: default_flat_shipping(),
        }
    }
}

/// Cart limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartConfig {
    /// Hard cap on the quantity of a single cart line.
    #[serde(default = "default_max_quantity")]
    pub max_quantity_per_item: u32,
}

fn default_max_quantity() -> u32 {
    10
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            max_quantity_per_item: default_max_quantity(),
        }
    }
}

/// Checkout settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutConfig {
    /// Payment method sent with every order.
    #[serde(default = "default_payment_method")]
    pub payment_method: String,
}

fn default_payment_method() -> String {
    "CARD".to_string()
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            payment_method: default_payment_method(),
        }
    }
}

/// Output format for logs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable format (for development).
    #[default]
    Human,
    /// JSON format (for log aggregation).
    Json,
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default level directive, e.g. `info` or `shelf_commerce=debug`.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}
