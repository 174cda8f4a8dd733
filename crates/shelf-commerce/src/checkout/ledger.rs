//! Local order ledger.
//!
//! When the backend can't take an order, the checkout records it here so the
//! customer's purchase isn't lost. The ledger is a JSON array of
//! [`OrderRecord`] under one storage key, rewritten wholesale on each change.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shelf_cache::Cache;
use std::fmt;

use crate::cart::{CartItem, PricingResult};
use crate::error::CommerceError;
use crate::ids::{OrderId, UserId};
use crate::money::Money;

/// Order status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Saved on this device only; the backend never confirmed it.
    #[default]
    LocalOnly,
    /// Order placed, awaiting processing.
    Pending,
    /// Order confirmed.
    Confirmed,
    /// Order being prepared.
    Processing,
    /// Order shipped.
    Shipped,
    /// Order delivered.
    Delivered,
    /// Order cancelled.
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::LocalOnly => "local_only",
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            OrderStatus::LocalOnly => "Saved on this device",
            OrderStatus::Pending => "Pending",
            OrderStatus::Confirmed => "Confirmed",
            OrderStatus::Processing => "Processing",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }

    /// Check if order is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Check if order can be cancelled.
    pub fn can_cancel(&self) -> bool {
        !self.is_terminal() && *self != OrderStatus::Shipped
    }

    fn rank(&self) -> u8 {
        match self {
            OrderStatus::LocalOnly => 0,
            OrderStatus::Pending => 1,
            OrderStatus::Confirmed => 2,
            OrderStatus::Processing => 3,
            OrderStatus::Shipped => 4,
            OrderStatus::Delivered => 5,
            OrderStatus::Cancelled => 6,
        }
    }

    /// Check if the order may move from this status to `next`.
    ///
    /// Orders only move forward; cancellation is allowed until shipping.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        if self.is_terminal() || *self == next {
            return false;
        }
        match next {
            OrderStatus::Cancelled => self.can_cancel(),
            OrderStatus::LocalOnly => false,
            _ => next.rank() > self.rank(),
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An order recorded on this device.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    pub order_id: OrderId,
    pub user_id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
    /// Copy of the cart at submission time.
    pub items: Vec<CartItem>,
    #[serde(with = "crate::money::decimal")]
    pub subtotal: Money,
    #[serde(with = "crate::money::decimal")]
    pub discount: Money,
    #[serde(with = "crate::money::decimal")]
    pub shipping: Money,
    #[serde(with = "crate::money::decimal")]
    pub total: Money,
    pub total_quantity: u32,
    pub order_timestamp: DateTime<Utc>,
    #[serde(default)]
    pub status: OrderStatus,
}

impl OrderRecord {
    /// Build a local-only record from a cart snapshot and its pricing.
    pub fn local(
        user_id: UserId,
        user_email: Option<String>,
        items: Vec<CartItem>,
        pricing: &PricingResult,
        order_timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            order_id: OrderId::local(),
            user_id,
            user_email,
            items,
            subtotal: pricing.subtotal,
            discount: pricing.discount_amount,
            shipping: pricing.shipping_cost,
            total: pricing.final_total,
            total_quantity: pricing.item_count,
            order_timestamp,
            status: OrderStatus::LocalOnly,
        }
    }
}

/// Orders recorded on this device, across all users.
#[derive(Debug, Clone)]
pub struct OrderLedger {
    cache: Cache,
    key: String,
}

impl OrderLedger {
    /// Open the ledger stored under `key`.
    pub fn new(cache: Cache, key: impl Into<String>) -> Self {
        Self {
            cache,
            key: key.into(),
        }
    }

    /// Storage key of the ledger.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Storage key a corrupt ledger is moved to.
    pub fn quarantine_key(&self) -> String {
        format!("{}.corrupt", self.key)
    }

    fn load(&self) -> Result<Vec<OrderRecord>, CommerceError> {
        match self.cache.get::<Vec<OrderRecord>>(&self.key) {
            Ok(records) => Ok(records.unwrap_or_default()),
            Err(e) if e.is_corrupt() => {
                self.quarantine(&e)?;
                Ok(Vec::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Move an unparsable ledger aside so the next write can't destroy it.
    fn quarantine(&self, cause: &shelf_cache::CacheError) -> Result<(), CommerceError> {
        let target = self.quarantine_key();
        tracing::error!(
            key = %self.key,
            quarantine = %target,
            error = %cause,
            "order ledger is corrupt, moving it aside"
        );
        if let Some(raw) = self.cache.get_raw(&self.key)? {
            self.cache.set_raw(&target, &raw)?;
        }
        self.cache.delete(&self.key)?;
        Ok(())
    }

    fn save(&self, records: &[OrderRecord]) -> Result<(), CommerceError> {
        self.cache.set(&self.key, records)?;
        Ok(())
    }

    /// Append a record.
    pub fn append(&self, record: OrderRecord) -> Result<(), CommerceError> {
        let mut records = self.load()?;
        tracing::info!(
            order_id = %record.order_id,
            user_id = %record.user_id,
            total = %record.total,
            "order recorded locally"
        );
        records.push(record);
        self.save(&records)
    }

    /// All records in insertion order.
    pub fn all(&self) -> Result<Vec<OrderRecord>, CommerceError> {
        self.load()
    }

    /// Records belonging to `user_id`, in insertion order.
    pub fn for_user(&self, user_id: &UserId) -> Result<Vec<OrderRecord>, CommerceError> {
        Ok(self
            .load()?
            .into_iter()
            .filter(|r| &r.user_id == user_id)
            .collect())
    }

    /// Get a record by id.
    pub fn get(&self, order_id: &OrderId) -> Result<Option<OrderRecord>, CommerceError> {
        Ok(self.load()?.into_iter().find(|r| &r.order_id == order_id))
    }

    /// Change a record's status, returning the updated record.
    pub fn set_status(
        &self,
        order_id: &OrderId,
        status: OrderStatus,
    ) -> Result<OrderRecord, CommerceError> {
        let mut records = self.load()?;
        let record = records
            .iter_mut()
            .find(|r| &r.order_id == order_id)
            .ok_or_else(|| CommerceError::OrderNotFound(order_id.to_string()))?;

        if !record.status.can_transition_to(status) {
            return Err(CommerceError::InvalidStatusTransition {
                from: record.status,
                to: status,
            });
        }

        tracing::info!(order_id = %order_id, from = %record.status, to = %status, "order status changed");
        record.status = status;
        let updated = record.clone();
        self.save(&records)?;
        Ok(updated)
    }

    /// Remove a record. Returns false if it wasn't there.
    pub fn remove(&self, order_id: &OrderId) -> Result<bool, CommerceError> {
        let mut records = self.load()?;
        let len_before = records.len();
        records.retain(|r| &r.order_id != order_id);
        if records.len() == len_before {
            return Ok(false);
        }
        self.save(&records)?;
        Ok(true)
    }
}
