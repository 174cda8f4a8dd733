//! Checkout module.
//!
//! Contains the order payload sent to the backend, the local fallback
//! ledger, and the submitter that drives a checkout attempt.

mod ledger;
mod payload;
mod submit;

pub use ledger::{OrderLedger, OrderRecord, OrderStatus};
pub use payload::{BookRef, OrderPayload, PayloadItem};
pub use submit::{CheckoutOutcome, CheckoutSubmitter, View};
