//! JSON-over-HTTP client bound to the storefront backend.

use http::StatusCode;
use reqwest::{Client, Response, Url};
use serde::{de::DeserializeOwned, Serialize};
use shelf_core::ApiConfig;

use crate::timeout::TimeoutConfig;

/// Error type for fetch operations.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The server answered with a non-2xx status.
    #[error("HTTP error: {status} for {url}")]
    Http {
        status: StatusCode,
        url: String,
        body: String,
    },

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Request error: {0}")]
    Request(String),
}

impl FetchError {
    /// HTTP status, if the server answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            FetchError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Response body, if the server answered at all.
    pub fn body(&self) -> Option<&str> {
        match self {
            FetchError::Http { body, .. } => Some(body),
            _ => None,
        }
    }

    /// True for HTTP 409, the backend's business-rule rejection.
    pub fn is_conflict(&self) -> bool {
        self.status() == Some(StatusCode::CONFLICT)
    }

    /// True when no response was received (timeout, refused, reset).
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            FetchError::Timeout(_) | FetchError::Connection(_) | FetchError::Request(_)
        )
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout(e.to_string())
        } else if e.is_connect() {
            FetchError::Connection(e.to_string())
        } else if e.is_decode() {
            FetchError::Deserialization(e.to_string())
        } else {
            FetchError::Request(e.to_string())
        }
    }
}

/// Client for the storefront REST API.
///
/// Each call is a single attempt; retry decisions belong to the caller.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    bearer_token: Option<String>,
    timeout: TimeoutConfig,
}

impl ApiClient {
    /// Create a new client for `base_url`.
    pub fn new(base_url: impl Into<String>, timeout: TimeoutConfig) -> Result<Self, FetchError> {
        let http = Client::builder()
            .connect_timeout(timeout.connect)
            .timeout(timeout.total)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            bearer_token: None,
            timeout,
        })
    }

    /// Create a client from the `[api]` configuration section.
    pub fn from_config(config: &ApiConfig) -> Result<Self, FetchError> {
        let client = Self::new(
            config.base_url.clone(),
            TimeoutConfig::from_millis(config.timeout_ms),
        )?;
        Ok(match &config.bearer_token {
            Some(token) => client.with_bearer_token(token.clone()),
            None => client,
        })
    }

    /// Attach a bearer token to every request.
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    /// The configured timeouts.
    pub fn timeout(&self) -> TimeoutConfig {
        self.timeout
    }

    /// Build an absolute URL for `path` with optional query parameters.
    pub fn url(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, FetchError> {
        let raw = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let parsed = if query.is_empty() {
            Url::parse(&raw)
        } else {
            Url::parse_with_params(&raw, query)
        };
        parsed.map_err(|e| FetchError::Request(format!("{raw}: {e}")))
    }

    /// GET `path` and decode the JSON body.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, FetchError> {
        let url = self.url(path, &[])?;
        tracing::debug!(%url, "GET");

        let mut request = self.http.get(url.clone());
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }

        let response = check_status(request.send().await?, &url).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes)
            .map_err(|e| FetchError::Deserialization(format!("{url}: {e}")))
    }

    /// POST a JSON body to `path` and return the response text.
    ///
    /// Success is decided by the status alone: a 2xx whose body can't be read
    /// returns an empty string.
    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        body: &B,
    ) -> Result<String, FetchError> {
        let url = self.url(path, query)?;
        tracing::debug!(%url, "POST");

        let mut request = self.http.post(url.clone()).json(body);
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }

        let response = check_status(request.send().await?, &url).await?;
        let status = response.status();
        match response.text().await {
            Ok(body) => Ok(body),
            Err(e) => {
                tracing::warn!(%url, %status, error = %e, "request accepted but response body unreadable");
                Ok(String::new())
            }
        }
    }
}

/// Turn non-2xx responses into [`FetchError::Http`], keeping the body.
async fn check_status(response: Response, url: &Url) -> Result<Response, FetchError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    tracing::debug!(%url, %status, "request rejected");
    Err(FetchError::Http {
        status,
        url: url.to_string(),
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Path;
    use axum::http::HeaderMap;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde::Deserialize;
    use std::time::Duration;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}/api")
    }

    /// Serve one connection: read the whole request, then reply with `raw`
    /// and close.
    async fn serve_raw(raw: &'static [u8]) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request_complete(&request) {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            socket.write_all(raw).await.unwrap();
            socket.shutdown().await.unwrap();
        });
        format!("http://{addr}/api")
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

    #[derive(Debug, Deserialize, PartialEq)]
    struct Stock {
        id: u32,
        quantity: u32,
    }

    fn router() -> Router {
        Router::new()
            .route(
                "/api/book/{id}",
                get(|Path(id): Path<u32>| async move {
                    Json(serde_json::json!({ "id": id, "quantity": 7 }))
                }),
            )
            .route(
                "/api/auth",
                get(|headers: HeaderMap| async move {
                    let auth = headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string();
                    Json(auth)
                }),
            )
            .route(
                "/api/orders/create",
                post(|| async { (StatusCode::CONFLICT, "Insufficient stock for book: Calculus") }),
            )
            .route(
                "/api/broken",
                get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
            )
            .route(
                "/api/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_millis(500)).await;
                    "late"
                }),
            )
    }

    #[tokio::test]
    async fn test_get_json() {
        let base = serve(router()).await;
        let client = ApiClient::new(base, TimeoutConfig::default()).unwrap();

        let stock: Stock = client.get_json("/book/3").await.unwrap();
        assert_eq!(stock, Stock { id: 3, quantity: 7 });
    }

    #[tokio::test]
    async fn test_bearer_token_is_sent() {
        let base = serve(router()).await;
        let client = ApiClient::new(base, TimeoutConfig::default())
            .unwrap()
            .with_bearer_token("abc");

        let echoed: String = client.get_json("auth").await.unwrap();
        assert_eq!(echoed, "Bearer abc");
    }

    #[tokio::test]
    async fn test_conflict_keeps_body() {
        let base = serve(router()).await;
        let client = ApiClient::new(base, TimeoutConfig::default()).unwrap();

        let err = client
            .post_json("/orders/create", &[("userId", "12")], &serde_json::json!({}))
            .await
            .unwrap_err();

        assert!(err.is_conflict());
        assert!(!err.is_transport());
        assert_eq!(err.body(), Some("Insufficient stock for book: Calculus"));
    }

    #[tokio::test]
    async fn test_post_accepted_with_truncated_body() {
        let base = serve_raw(b"HTTP/1.1 201 Created\r\nContent-Length: 100\r\n\r\n{\"orderId\":").await;
        let client = ApiClient::new(base, TimeoutConfig::default()).unwrap();

        let body = client
            .post_json("/orders/create", &[("userId", "12")], &serde_json::json!({ "items": [] }))
            .await
            .unwrap();
        assert_eq!(body, "");
    }

    #[tokio::test]
    async fn test_server_error_is_http_error() {
        let base = serve(router()).await;
        let client = ApiClient::new(base, TimeoutConfig::default()).unwrap();

        let err = client.get_json::<Stock>("/broken").await.unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(!err.is_conflict());
    }

    #[tokio::test]
    async fn test_timeout_is_transport_error() {
        let base = serve(router()).await;
        let client = ApiClient::new(base, TimeoutConfig::from_millis(100)).unwrap();

        let err = client.get_json::<String>("/slow").await.unwrap_err();
        assert!(matches!(err, FetchError::Timeout(_)), "got {err:?}");
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn test_refused_connection_is_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = ApiClient::new(format!("http://{addr}"), TimeoutConfig::default()).unwrap();
        let err = client.get_json::<Stock>("/book/1").await.unwrap_err();
        assert!(err.is_transport(), "got {err:?}");
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_url_building() {
        let client = ApiClient::new("http://host/bookstore/api/", TimeoutConfig::default()).unwrap();
        let url = client
            .url("/orders/create", &[("userId", "7")])
            .unwrap();
        assert_eq!(url.as_str(), "http://host/bookstore/api/orders/create?userId=7");
    }

    #[test]
    fn test_from_config() {
        let config = ApiConfig {
            base_url: "http://localhost:9000/api".to_string(),
            timeout_ms: 2_000,
            bearer_token: Some("t".to_string()),
        };
        let client = ApiClient::from_config(&config).unwrap();
        assert_eq!(client.timeout().total, Duration::from_secs(2));
        assert_eq!(client.bearer_token.as_deref(), Some("t"));
    }
}
