//! Order history module.
//!
//! Contains the backend's order representation and the reader that picks
//! between remote orders and the local fallback ledger.

mod history;
mod remote;

pub use history::{load_order_history, HistoryEntry, HistorySource, OrderHistory};
pub use remote::{RemoteOrder, RemoteOrderItem};
