//! Orders as returned by `GET /orders/customer/{userId}`.
//!
//! Backend versions disagree on field names (`total` vs `totalAmount`,
//! `createdAt` vs `orderTimestamp`), so orders are read through a lenient
//! wire struct and normalized.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::checkout::BookRef;
use crate::ids::OrderId;
use crate::money::{Currency, Money};

/// One line of a remote order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RemoteOrderItem {
    #[serde(default)]
    pub quantity: u32,
    #[serde(default, with = "crate::money::decimal::option")]
    pub price: Option<Money>,
    #[serde(default)]
    pub book: Option<BookRef>,
    /// Whether current stock covers this line. Filled in when history is
    /// loaded; `None` until then.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available: Option<bool>,
}

/// A server-side order, normalized.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", from = "RemoteOrderWire")]
pub struct RemoteOrder {
    pub order_id: Option<OrderId>,
    pub items: Vec<RemoteOrderItem>,
    #[serde(with = "crate::money::decimal")]
    pub total: Money,
    pub total_quantity: u32,
    pub created_at: Option<DateTime<Utc>>,
    pub status: String,
    pub shipping_address: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoteOrderWire {
    #[serde(default, alias = "id")]
    order_id: Option<OrderId>,
    #[serde(default)]
    items: Option<Vec<RemoteOrderItem>>,
    #[serde(default)]
    total: Option<f64>,
    #[serde(default)]
    total_amount: Option<f64>,
    #[serde(default)]
    total_quantity: Option<u32>,
    #[serde(default)]
    created_at: Option<serde_json::Value>,
    #[serde(default)]
    order_timestamp: Option<serde_json::Value>,
    #[serde(default)]
    order_date: Option<serde_json::Value>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    shipping_address: Option<String>,
}

impl From<RemoteOrderWire> for RemoteOrder {
    fn from(wire: RemoteOrderWire) -> Self {
        let items = wire.items.unwrap_or_default();
        // A zero total means "not reported"; fall through to the alias
        let total = wire
            .total
            .filter(|t| *t != 0.0)
            .or(wire.total_amount)
            .unwrap_or(0.0);
        let total_quantity = wire
            .total_quantity
            .filter(|q| *q != 0)
            .unwrap_or_else(|| {
                items
                    .iter()
                    .fold(0u32, |acc, i| acc.saturating_add(i.quantity))
            });
        let created_at = [wire.created_at, wire.order_timestamp, wire.order_date]
            .iter()
            .flatten()
            .find_map(parse_timestamp);

        Self {
            order_id: wire.order_id,
            items,
            total: Money::from_decimal(total, Currency::default()),
            total_quantity,
            created_at,
            status: wire.status.unwrap_or_else(|| "pending".to_string()),
            shipping_address: wire.shipping_address,
        }
    }
}

/// Accepts RFC 3339, zone-less ISO timestamps (taken as UTC) and epoch
/// milliseconds.
fn parse_timestamp(value: &serde_json::Value) -> Option<DateTime<Utc>> {
    match value {
        serde_json::Value::String(s) => DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
                    .ok()
                    .map(|naive| naive.and_utc())
            }),
        serde_json::Value::Number(n) => n
            .as_i64()
            .and_then(|millis| Utc.timestamp_millis_opt(millis).single()),
        _ => None,
    }
}
