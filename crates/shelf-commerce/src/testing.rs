//! Test doubles: an in-process [`StorefrontApi`] and a storage backend
//! that refuses writes.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use shelf_cache::{Backend, CacheError, MemoryBackend};
use shelf_data::FetchError;
use tokio::sync::Notify;

use crate::api::{StorefrontApi, SubmissionResult};
use crate::catalog::Book;
use crate::checkout::OrderPayload;
use crate::ids::{ProductId, UserId};
use crate::orders::RemoteOrder;

type ErrorFactory = Box<dyn Fn() -> FetchError + Send + Sync>;

enum Submission {
    Accept,
    Conflict(String),
    Fail(ErrorFactory),
}

enum BookAnswer {
    Found(Book),
    Missing,
    Fail(ErrorFactory),
}

/// Scripted backend. Records every order submission and stock lookup.
pub(crate) struct FakeApi {
    submission: Submission,
    gate: Option<Arc<Notify>>,
    catalog: Vec<Book>,
    books: HashMap<ProductId, BookAnswer>,
    orders: Result<Vec<RemoteOrder>, ErrorFactory>,
    submitted: Mutex<Vec<(UserId, OrderPayload)>>,
    lookups: Mutex<Vec<ProductId>>,
}

impl FakeApi {
    fn with_submission(submission: Submission) -> Self {
        Self {
            submission,
            gate: None,
            catalog: Vec::new(),
            books: HashMap::new(),
            orders: Ok(Vec::new()),
            submitted: Mutex::default(),
            lookups: Mutex::default(),
        }
    }

    pub fn accepting() -> Self {
        Self::with_submission(Submission::Accept)
    }

    pub fn conflicting(message: &str) -> Self {
        Self::with_submission(Submission::Conflict(message.to_string()))
    }

    pub fn failing(error: impl Fn() -> FetchError + Send + Sync + 'static) -> Self {
        Self::with_submission(Submission::Fail(Box::new(error)))
    }

    /// Hold each order submission until `gate` is notified.
    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Serve `book` from both `GET /book/all` and `GET /book/{id}`.
    pub fn with_book(mut self, book: Book) -> Self {
        self.catalog.push(book.clone());
        self.books.insert(book.id.clone(), BookAnswer::Found(book));
        self
    }

    pub fn with_book_missing(mut self, id: impl Into<ProductId>) -> Self {
        self.books.insert(id.into(), BookAnswer::Missing);
        self
    }

    pub fn with_book_error(
        mut self,
        id: impl Into<ProductId>,
        error: impl Fn() -> FetchError + Send + Sync + 'static,
    ) -> Self {
        self.books.insert(id.into(), BookAnswer::Fail(Box::new(error)));
        self
    }

    pub fn with_orders(mut self, orders: Vec<RemoteOrder>) -> Self {
        self.orders = Ok(orders);
        self
    }

    pub fn with_orders_error(
        mut self,
        error: impl Fn() -> FetchError + Send + Sync + 'static,
    ) -> Self {
        self.orders = Err(Box::new(error));
        self
    }

    pub fn submitted(&self) -> Vec<(UserId, OrderPayload)> {
        self.submitted.lock().unwrap().clone()
    }

    pub fn book_lookups(&self) -> usize {
        self.lookups.lock().unwrap().len()
    }
}

#[async_trait]
impl StorefrontApi for FakeApi {
    async fn books(&self) -> Result<Vec<Book>, FetchError> {
        Ok(self.catalog.clone())
    }

    async fn book(&self, id: &ProductId) -> Result<Option<Book>, FetchError> {
        self.lookups.lock().unwrap().push(id.clone());
        match self.books.get(id) {
            Some(BookAnswer::Found(book)) => Ok(Some(book.clone())),
            Some(BookAnswer::Missing) | None => Ok(None),
            Some(BookAnswer::Fail(error)) => Err(error()),
        }
    }

    async fn create_order(&self, user_id: &UserId, payload: &OrderPayload) -> SubmissionResult {
        self.submitted
            .lock()
            .unwrap()
            .push((user_id.clone(), payload.clone()));
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        match &self.submission {
            Submission::Accept => SubmissionResult::Accepted,
            Submission::Conflict(message) => SubmissionResult::Conflict(message.clone()),
            Submission::Fail(error) => SubmissionResult::Transient(error()),
        }
    }

    async fn customer_orders(&self, _user_id: &UserId) -> Result<Vec<RemoteOrder>, FetchError> {
        match &self.orders {
            Ok(orders) => Ok(orders.clone()),
            Err(error) => Err(error()),
        }
    }
}

/// Accepts reads, fails every write.
#[derive(Debug, Default)]
pub(crate) struct ReadOnlyBackend {
    inner: MemoryBackend,
}

impl Backend for ReadOnlyBackend {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        self.inner.get(key)
    }

    fn set(&self, _key: &str, _value: &[u8]) -> Result<(), CacheError> {
        Err(CacheError::StoreError("disk full".to_string()))
    }

    fn delete(&self, _key: &str) -> Result<(), CacheError> {
        Err(CacheError::StoreError("disk full".to_string()))
    }

    fn keys(&self) -> Result<Vec<String>, CacheError> {
        self.inner.keys()
    }
}
