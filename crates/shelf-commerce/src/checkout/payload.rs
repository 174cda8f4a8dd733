//! Order payload for `POST /orders/create`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cart::CartItem;
use crate::ids::ProductId;
use crate::money::Money;

/// Status every new order is submitted with.
pub const SUBMITTED_STATUS: &str = "Pending";

/// Reference to a book by id, as nested in order lines.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookRef {
    #[serde(rename = "bookId", alias = "productId")]
    pub book_id: ProductId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl BookRef {
    pub fn new(book_id: ProductId) -> Self {
        Self {
            book_id,
            title: None,
        }
    }
}

/// One order line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PayloadItem {
    pub quantity: u32,
    #[serde(with = "crate::money::decimal")]
    pub price: Money,
    pub book: BookRef,
}

impl From<&CartItem> for PayloadItem {
    fn from(item: &CartItem) -> Self {
        Self {
            quantity: item.quantity,
            price: item.unit_price,
            book: BookRef::new(item.product_id.clone()),
        }
    }
}

/// Body of an order creation request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderPayload {
    pub shipping_address: String,
    pub payment_method: String,
    pub status: String,
    pub order_timestamp: DateTime<Utc>,
    #[serde(with = "crate::money::decimal")]
    pub total_amount: Money,
    pub items: Vec<PayloadItem>,
}

impl OrderPayload {
    /// Build a payload for `items` charged at `total_amount`.
    pub fn new(
        items: &[CartItem],
        total_amount: Money,
        shipping_address: impl Into<String>,
        payment_method: impl Into<String>,
        order_timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            shipping_address: shipping_address.into(),
            payment_method: payment_method.into(),
            status: SUBMITTED_STATUS.to_string(),
            order_timestamp,
            total_amount,
            items: items.iter().map(PayloadItem::from).collect(),
        }
    }
}
