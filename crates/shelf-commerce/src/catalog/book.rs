//! Book type.

use crate::ids::ProductId;
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// Genres offered as browse filters.
pub const GENRES: &[&str] = &[
    "Academic Textbooks",
    "Science & Technology",
    "Literature & Fiction",
    "Business & Economics",
    "History & Politics",
    "Arts & Culture",
    "Health & Medicine",
    "Engineering",
];

/// A book as returned by `GET /book/{id}` and `GET /book/all`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    #[serde(rename = "bookId", alias = "productId")]
    pub id: ProductId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub genre: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pages: Option<u32>,
    /// Current stock. The backend may report negative values after
    /// manual adjustments.
    #[serde(default)]
    pub quantity: i64,
    #[serde(with = "crate::money::decimal")]
    pub price: Money,
}

impl Book {
    /// Check if at least one copy can be sold.
    pub fn in_stock(&self) -> bool {
        self.quantity > 0
    }

    /// Check if `quantity` copies can be supplied.
    pub fn can_fulfill(&self, quantity: u32) -> bool {
        self.quantity >= i64::from(quantity)
    }

    /// Stock as a cart limit (negative stock counts as none).
    pub fn available(&self) -> u32 {
        u32::try_from(self.quantity.max(0)).unwrap_or(u32::MAX)
    }
}
