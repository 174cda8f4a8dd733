//! Order history reader.
//!
//! Remote orders are authoritative: when the backend has any orders for the
//! user, those are shown and local ledger records are not. Local records are
//! shown only when the backend has none or can't be reached.

use chrono::{DateTime, Utc};
use futures::future::join_all;

use crate::api::StorefrontApi;
use crate::checkout::{OrderLedger, OrderRecord};
use crate::ids::UserId;
use crate::money::Money;
use crate::orders::{RemoteOrder, RemoteOrderItem};

/// Where the entries of an [`OrderHistory`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistorySource {
    /// The backend returned at least one order.
    Remote,
    /// The backend returned no orders; local records are shown.
    Local,
    /// The backend request failed; local records are shown.
    LocalAfterError,
}

/// One row of the order history.
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryEntry {
    Remote(RemoteOrder),
    Local(OrderRecord),
}

impl HistoryEntry {
    /// When the order was placed, if known.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            HistoryEntry::Remote(order) => order.created_at,
            HistoryEntry::Local(record) => Some(record.order_timestamp),
        }
    }

    pub fn total(&self) -> Money {
        match self {
            HistoryEntry::Remote(order) => order.total,
            HistoryEntry::Local(record) => record.total,
        }
    }

    pub fn total_quantity(&self) -> u32 {
        match self {
            HistoryEntry::Remote(order) => order.total_quantity,
            HistoryEntry::Local(record) => record.total_quantity,
        }
    }

    /// Status label as stored.
    pub fn status(&self) -> &str {
        match self {
            HistoryEntry::Remote(order) => &order.status,
            HistoryEntry::Local(record) => record.status.as_str(),
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, HistoryEntry::Local(_))
    }
}

/// A user's orders, newest first.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderHistory {
    pub source: HistorySource,
    pub entries: Vec<HistoryEntry>,
    /// Local records for the user that are not shown because remote orders
    /// exist.
    pub hidden_local: usize,
}

impl OrderHistory {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Load the order history for `user_id`.
///
/// Never fails: backend and storage errors degrade to whatever can still be
/// shown.
pub async fn load_order_history<A: StorefrontApi + ?Sized>(
    api: &A,
    ledger: &OrderLedger,
    user_id: &UserId,
) -> OrderHistory {
    let local = match ledger.for_user(user_id) {
        Ok(records) => records,
        Err(e) => {
            tracing::warn!(user_id = %user_id, error = %e, "local order ledger unreadable");
            Vec::new()
        }
    };

    let (source, mut entries, hidden_local) = match api.customer_orders(user_id).await {
        Ok(remote) if !remote.is_empty() => {
            let remote = annotate_availability(api, remote).await;
            if !local.is_empty() {
                tracing::debug!(user_id = %user_id, hidden = local.len(), "local orders hidden by remote history");
            }
            let entries = remote.into_iter().map(HistoryEntry::Remote).collect();
            (HistorySource::Remote, entries, local.len())
        }
        Ok(_) => (HistorySource::Local, local_entries(local), 0),
        Err(e) => {
            tracing::warn!(user_id = %user_id, error = %e, "order history fetch failed, showing local orders");
            (HistorySource::LocalAfterError, local_entries(local), 0)
        }
    };

    // Newest first; orders without a timestamp go last
    entries.sort_by(|a, b| b.timestamp().cmp(&a.timestamp()));

    OrderHistory {
        source,
        entries,
        hidden_local,
    }
}

fn local_entries(records: Vec<OrderRecord>) -> Vec<HistoryEntry> {
    records.into_iter().map(HistoryEntry::Local).collect()
}

/// Mark each line with whether current stock still covers it. Lookups run
/// concurrently.
async fn annotate_availability<A: StorefrontApi + ?Sized>(
    api: &A,
    mut orders: Vec<RemoteOrder>,
) -> Vec<RemoteOrder> {
    let checks = orders
        .iter()
        .flat_map(|order| order.items.iter())
        .map(|item| item_available(api, item));
    let mut results = join_all(checks).await.into_iter();

    for item in orders.iter_mut().flat_map(|order| order.items.iter_mut()) {
        item.available = results.next().flatten();
    }
    orders
}

/// Lines without a book reference can't be checked and count as available.
async fn item_available<A: StorefrontApi + ?Sized>(
    api: &A,
    item: &RemoteOrderItem,
) -> Option<bool> {
    let Some(book) = &item.book else {
        return Some(true);
    };
    let book_id = &book.book_id;
    match api.book(book_id).await {
        Ok(Some(book)) => Some(book.can_fulfill(item.quantity)),
        Ok(None) => Some(false),
        Err(e) => {
            // Never hide history over a failed stock check
            tracing::warn!(product_id = %book_id, error = %e, "stock lookup failed, assuming available");
            Some(true)
        }
    }
}
