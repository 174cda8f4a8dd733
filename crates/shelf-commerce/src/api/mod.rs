//! Backend API seam.
//!
//! [`StorefrontApi`] lists the backend calls the storefront makes. The HTTP
//! implementation lives in [`HttpStorefrontApi`]; tests substitute their own.

mod rest;

pub use rest::HttpStorefrontApi;

use async_trait::async_trait;
use shelf_data::FetchError;

use crate::catalog::Book;
use crate::checkout::OrderPayload;
use crate::ids::{ProductId, UserId};
use crate::orders::RemoteOrder;

/// Message shown when the backend rejects an order without saying why.
pub const DEFAULT_CONFLICT_MESSAGE: &str = "Some items are unavailable in the requested quantities.";

/// Outcome of a single order submission attempt.
#[derive(Debug)]
pub enum SubmissionResult {
    /// The backend accepted the order.
    Accepted,
    /// The backend refused the order for a business reason (stock).
    Conflict(String),
    /// Anything else: no response, timeout, unexpected status.
    Transient(FetchError),
}

impl SubmissionResult {
    /// Classify the raw result of a create-order request.
    pub fn from_response<T>(result: Result<T, FetchError>) -> Self {
        match result {
            Ok(_) => SubmissionResult::Accepted,
            Err(e) if e.is_conflict() => {
                SubmissionResult::Conflict(conflict_message(e.body().unwrap_or_default()))
            }
            Err(e) => SubmissionResult::Transient(e),
        }
    }
}

/// Extract the human-readable message from a 409 body.
///
/// The backend sends either plain text, a JSON string, or a JSON object
/// with a `message` field.
pub fn conflict_message(body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        return DEFAULT_CONFLICT_MESSAGE.to_string();
    }

    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(serde_json::Value::String(s)) if !s.trim().is_empty() => s,
        Ok(serde_json::Value::Object(map)) => map
            .get("message")
            .and_then(|m| m.as_str())
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(DEFAULT_CONFLICT_MESSAGE)
            .to_string(),
        Ok(serde_json::Value::String(_)) => DEFAULT_CONFLICT_MESSAGE.to_string(),
        _ => body.to_string(),
    }
}

/// Backend calls made by the storefront.
#[async_trait]
pub trait StorefrontApi: Send + Sync {
    /// `GET /book/all`.
    async fn books(&self) -> Result<Vec<Book>, FetchError>;

    /// `GET /book/{id}`. `None` when the backend answers with no book.
    async fn book(&self, id: &ProductId) -> Result<Option<Book>, FetchError>;

    /// `POST /orders/create?userId={id}`. A single attempt, never retried.
    async fn create_order(&self, user_id: &UserId, payload: &OrderPayload) -> SubmissionResult;

    /// `GET /orders/customer/{userId}`.
    async fn customer_orders(&self, user_id: &UserId) -> Result<Vec<RemoteOrder>, FetchError>;
}
