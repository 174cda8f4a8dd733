//! Commerce error types.

use shelf_cache::CacheError;
use shelf_data::FetchError;
use thiserror::Error;

use crate::checkout::OrderStatus;
use crate::ids::ProductId;

/// Errors that can occur in storefront operations.
#[derive(Error, Debug)]
pub enum CommerceError {
    /// Order not found in the local ledger.
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// Invalid quantity.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// Quantity exceeds the per-item limit.
    #[error("Quantity {requested} of {product_id} exceeds maximum allowed ({limit})")]
    QuantityExceedsLimit {
        product_id: ProductId,
        requested: i64,
        limit: u32,
    },

    /// Negative unit price.
    #[error("Invalid price for {0}: prices cannot be negative")]
    InvalidPrice(ProductId),

    /// Status change not allowed for an order.
    #[error("Invalid order status transition from {from} to {to}")]
    InvalidStatusTransition { from: OrderStatus, to: OrderStatus },

    /// A checkout for this session is already running.
    #[error("Checkout already in progress")]
    CheckoutInProgress,

    /// Local storage error.
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    /// Backend request error.
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),
}
