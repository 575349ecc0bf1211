//! Document-store contract for the product collection.

use crate::domain::product::{DocumentUpdate, ProductId};
use async_trait::async_trait;
use serde_json::{Map, Value as JsonValue};

/// A stored document (JSON object without the id key).
pub type Document = Map<String, JsonValue>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("stored document is corrupt: {0}")]
    Corrupt(String),
    #[error("invalid collection namespace '{0}'")]
    InvalidName(String),
}

/// Outcome of `update_one`, mirroring a document store's matched/modified counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateResult {
    pub matched: u64,
    pub modified: u64,
}

/// A single collection of id-keyed documents.
///
/// Every method is one atomic store call. Implementations are shared between
/// concurrent requests, so they must be `Send + Sync`.
#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn find_all(&self) -> Result<Vec<(ProductId, Document)>, StoreError>;

    async fn find_one(&self, id: ProductId) -> Result<Option<Document>, StoreError>;

    /// Inserts `doc` under a freshly generated id and returns that id.
    async fn insert_one(&self, doc: Document) -> Result<ProductId, StoreError>;

    async fn update_one(
        &self,
        id: ProductId,
        update: &DocumentUpdate,
    ) -> Result<UpdateResult, StoreError>;

    /// Returns the number of deleted documents (0 or 1).
    async fn delete_one(&self, id: ProductId) -> Result<u64, StoreError>;

    /// Cheap round-trip used by the health endpoint.
    async fn ping(&self) -> Result<(), StoreError>;
}
