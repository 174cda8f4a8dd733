//! [`StorefrontApi`] over the bookstore REST API.

use async_trait::async_trait;
use shelf_core::ApiConfig;
use shelf_data::{ApiClient, FetchError};

use crate::api::{StorefrontApi, SubmissionResult};
use crate::catalog::Book;
use crate::checkout::OrderPayload;
use crate::ids::{ProductId, UserId};
use crate::orders::RemoteOrder;

/// REST implementation of [`StorefrontApi`].
#[derive(Debug, Clone)]
pub struct HttpStorefrontApi {
    client: ApiClient,
}

impl HttpStorefrontApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Build the client from the `[api]` configuration section.
    pub fn from_config(config: &ApiConfig) -> Result<Self, FetchError> {
        Ok(Self::new(ApiClient::from_config(config)?))
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }
}

#[async_trait]
impl StorefrontApi for HttpStorefrontApi {
    async fn books(&self) -> Result<Vec<Book>, FetchError> {
        let books: Option<Vec<Book>> = self.client.get_json("book/all").await?;
        Ok(books.unwrap_or_default())
    }

    async fn book(&self, id: &ProductId) -> Result<Option<Book>, FetchError> {
        self.client.get_json(&format!("book/{id}")).await
    }

    async fn create_order(&self, user_id: &UserId, payload: &OrderPayload) -> SubmissionResult {
        let result = self
            .client
            .post_json("orders/create", &[("userId", user_id.as_str())], payload)
            .await;

        match &result {
            Ok(_) => tracing::info!(user_id = %user_id, total = %payload.total_amount, "order submitted"),
            Err(e) => tracing::debug!(user_id = %user_id, error = %e, "order submission failed"),
        }
        SubmissionResult::from_response(result)
    }

    async fn customer_orders(&self, user_id: &UserId) -> Result<Vec<RemoteOrder>, FetchError> {
        let orders: Option<Vec<Option<RemoteOrder>>> = self
            .client
            .get_json(&format!("orders/customer/{user_id}"))
            .await?;
        Ok(orders.unwrap_or_default().into_iter().flatten().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::CartItem;
    use crate::money::Money;
    use axum::extract::{Path, Query};
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use chrono::Utc;
    use serde_json::{json, Value};
    use shelf_data::TimeoutConfig;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    async fn serve(router: Router) -> HttpStorefrontApi {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        let client = ApiClient::new(format!("http://{addr}/bookstore/api"), TimeoutConfig::default())
            .unwrap();
        HttpStorefrontApi::new(client)
    }

    /// Accept one connection, read the full request, reply with `raw` and
    /// close.
    async fn serve_raw(raw: &'static [u8]) -> HttpStorefrontApi {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                request.extend_from_slice(&buf[..n]);
                if n == 0 || request_complete(&request) {
                    break;
                }
            }
            socket.write_all(raw).await.unwrap();
            socket.shutdown().await.unwrap();
        });
        let client = ApiClient::new(format!("http://{addr}/bookstore/api"), TimeoutConfig::default())
            .unwrap();
        HttpStorefrontApi::new(client)
    }

    fn request_complete(request: &[u8]) -> bool {
        let text = String::from_utf8_lossy(request);
        let Some(end) = text.find("\r\n\r\n") else {
            return false;
        };
        let length = text[..end]
            .lines()
            .find_map(|line| {
                let line = line.to_ascii_lowercase();
                line.strip_prefix("content-length:")
                    .map(|v| v.trim().parse::<usize>().unwrap_or(0))
            })
            .unwrap_or(0);
        request.len() >= end + 4 + length
    }

    fn payload() -> OrderPayload {
        let items = vec![CartItem::new(3u64, "Calculus", Money::rand(10_000))
            .unwrap()
            .with_quantity(2)];
        OrderPayload::new(&items, Money::rand(24_000), "Res 4", "CARD", Utc::now())
    }

    #[tokio::test]
    async fn test_book_lookup() {
        let api = serve(Router::new().route(
            "/bookstore/api/book/{id}",
            get(|Path(id): Path<String>| async move {
                if id == "404" {
                    Json(Value::Null)
                } else {
                    Json(json!({ "bookId": id.parse::<u64>().unwrap(), "quantity": 4, "price": 120.0 }))
                }
            }),
        ))
        .await;

        let book = api.book(&ProductId::new("3")).await.unwrap().unwrap();
        assert_eq!(book.quantity, 4);
        assert_eq!(api.book(&ProductId::new("404")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_books_null_is_empty() {
        let api = serve(Router::new().route(
            "/bookstore/api/book/all",
            get(|| async { Json(Value::Null) }),
        ))
        .await;
        assert!(api.books().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_order_sends_user_and_body() {
        let seen: Arc<Mutex<Vec<(String, Value)>>> = Arc::default();
        let captured = seen.clone();
        let api = serve(Router::new().route(
            "/bookstore/api/orders/create",
            post(
                move |Query(q): Query<HashMap<String, String>>, Json(body): Json<Value>| async move {
                    let user = q.get("userId").cloned().unwrap_or_default();
                    captured.lock().unwrap().push((user, body));
                    (StatusCode::CREATED, Json(json!({ "orderId": 77 })))
                },
            ),
        ))
        .await;

        let result = api.create_order(&UserId::new("12"), &payload()).await;
        assert!(matches!(result, SubmissionResult::Accepted));

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, "12");
        assert_eq!(seen[0].1["items"][0]["book"]["bookId"], 3);
        assert_eq!(seen[0].1["totalAmount"], 240.0);
    }

    #[tokio::test]
    async fn test_create_order_conflict() {
        let api = serve(Router::new().route(
            "/bookstore/api/orders/create",
            post(|| async { (StatusCode::CONFLICT, "Insufficient stock for book: Calculus") }),
        ))
        .await;

        match api.create_order(&UserId::new("12"), &payload()).await {
            SubmissionResult::Conflict(message) => {
                assert_eq!(message, "Insufficient stock for book: Calculus")
            }
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_created_with_cut_off_body_is_accepted() {
        // The order exists server-side even though the reply never finished
        let api = serve_raw(b"HTTP/1.1 201 Created\r\nContent-Length: 100\r\n\r\n{\"orderId\":").await;

        let result = api.create_order(&UserId::new("12"), &payload()).await;
        assert!(matches!(result, SubmissionResult::Accepted), "got {result:?}");
    }

    #[tokio::test]
    async fn test_create_order_server_error_is_transient() {
        let api = serve(Router::new().route(
            "/bookstore/api/orders/create",
            post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "maintenance") }),
        ))
        .await;

        let result = api.create_order(&UserId::new("12"), &payload()).await;
        assert!(matches!(result, SubmissionResult::Transient(_)));
    }

    #[tokio::test]
    async fn test_customer_orders_skips_nulls() {
        let api = serve(Router::new().route(
            "/bookstore/api/orders/customer/{user_id}",
            get(|Path(user_id): Path<String>| async move {
                assert_eq!(user_id, "12");
                Json(json!([
                    { "orderId": 1, "totalAmount": 240, "items": [] },
                    null
                ]))
            }),
        ))
        .await;

        let orders = api.customer_orders(&UserId::new("12")).await.unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].total, Money::rand(24_000));
    }
}
