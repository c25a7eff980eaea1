//! Document store: named collections of schema-less JSON documents.
//!
//! Queries are conjunctions of equality predicates. Results carry no ordering
//! unless one is requested, and the only ordering offered is by document
//! creation time.

pub mod entities;
mod memory;
mod postgres;

use async_trait::async_trait;
use serde_json::Value;

use common::AppResult;
use domain::{Document, Fields};

pub use memory::MemoryDocumentStore;
pub use postgres::PgDocumentStore;

/// Ordering by document creation time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    NewestFirst,
    OldestFirst,
}

/// Equality-filtered collection query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    /// Every field must equal the given value
    pub filters: Fields,
    pub order: Option<Order>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an equality predicate
    pub fn where_eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.filters.insert(field.to_string(), value.into());
        self
    }

    pub fn order(mut self, order: Order) -> Self {
        self.order = Some(order);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Whether stored fields satisfy every predicate
    pub fn matches(&self, fields: &Fields) -> bool {
        self.filters
            .iter()
            .all(|(field, expected)| fields.get(field) == Some(expected))
    }
}

/// Access to the document database.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a document by identifier
    async fn get(&self, collection: &str, id: &str) -> AppResult<Option<Document>>;

    /// Run an equality-filtered query
    async fn query(&self, collection: &str, query: Query) -> AppResult<Vec<Document>>;

    /// Count documents matching the query's predicates (ordering and paging ignored)
    async fn count(&self, collection: &str, query: Query) -> AppResult<u64>;

    /// Insert a document under a generated identifier
    async fn insert(&self, collection: &str, fields: Fields) -> AppResult<Document>;

    /// Create or replace a document under a caller-chosen identifier
    async fn set(&self, collection: &str, id: &str, fields: Fields) -> AppResult<Document>;

    /// Merge fields into an existing document; `None` when it does not exist
    async fn update(&self, collection: &str, id: &str, patch: Fields)
        -> AppResult<Option<Document>>;

    /// Replace a document's fields only if its stored fields contain every
    /// `expected` value. Check and write are atomic; returns whether the
    /// document was replaced.
    async fn replace_if(
        &self,
        collection: &str,
        id: &str,
        expected: Fields,
        fields: Fields,
    ) -> AppResult<bool>;

    /// Delete a document, returning whether it existed
    async fn delete(&self, collection: &str, id: &str) -> AppResult<bool>;

    /// Check backend connectivity
    async fn ping(&self) -> AppResult<()>;
}
