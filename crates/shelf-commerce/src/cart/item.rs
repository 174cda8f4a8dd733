//! Cart line item.

use crate::catalog::Book;
use crate::error::CommerceError;
use crate::ids::ProductId;
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// One line of the cart.
///
/// Field names on the wire match the persisted snapshot written by earlier
/// storefront versions, so existing carts load unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Product being purchased. Unique within a cart.
    #[serde(rename = "bookId")]
    pub product_id: ProductId,
    /// Title (denormalized for display).
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub genre: String,
    /// Unit price.
    #[serde(rename = "price", with = "crate::money::decimal")]
    pub unit_price: Money,
    /// Quantity.
    pub quantity: u32,
    /// Stock observed when the line was added.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_quantity: Option<u32>,
}

impl CartItem {
    /// Create a line with quantity 1.
    ///
    /// Returns an error if the unit price is negative.
    pub fn new(
        product_id: impl Into<ProductId>,
        title: impl Into<String>,
        unit_price: Money,
    ) -> Result<Self, CommerceError> {
        let product_id = product_id.into();
        if unit_price.is_negative() {
            return Err(CommerceError::InvalidPrice(product_id));
        }
        Ok(Self {
            product_id,
            title: title.into(),
            author: String::new(),
            genre: String::new(),
            unit_price,
            quantity: 1,
            max_quantity: None,
        })
    }

    /// Create a line for `book`, capturing its current stock.
    pub fn from_book(book: &Book) -> Result<Self, CommerceError> {
        let mut item = Self::new(book.id.clone(), book.title.clone(), book.price)?;
        item.author = book.author.clone();
        item.genre = book.genre.clone();
        item.max_quantity = Some(book.available());
        Ok(item)
    }

    /// Set the quantity.
    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    /// Set the author.
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    /// Set the known stock.
    pub fn with_max_quantity(mut self, max_quantity: u32) -> Self {
        self.max_quantity = Some(max_quantity);
        self
    }

    /// Line total (unit price times quantity), saturating on overflow.
    pub fn line_total(&self) -> Money {
        let cents = self
            .unit_price
            .amount_cents
            .saturating_mul(i64::from(self.quantity));
        Money::new(cents, self.unit_price.currency)
    }
}
