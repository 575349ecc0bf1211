//! In-process product collection. Backs the HTTP tests and database-less runs.

use crate::domain::product::{DocumentUpdate, ProductId};
use crate::storage::store::{Document, ProductStore, StoreError, UpdateResult};
use async_trait::async_trait;
use tokio::sync::RwLock;

/// Documents kept in insertion order.
#[derive(Default)]
pub struct MemoryProductStore {
    docs: RwLock<Vec<(ProductId, Document)>>,
}

impl MemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.docs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.docs.read().await.is_empty()
    }
}

#[async_trait]
impl ProductStore for MemoryProductStore {
    async fn find_all(&self) -> Result<Vec<(ProductId, Document)>, StoreError> {
        Ok(self.docs.read().await.clone())
    }

    async fn find_one(&self, id: ProductId) -> Result<Option<Document>, StoreError> {
        let docs = self.docs.read().await;
        Ok(docs.iter().find(|(k, _)| *k == id).map(|(_, d)| d.clone()))
    }

    async fn insert_one(&self, doc: Document) -> Result<ProductId, StoreError> {
        let id = ProductId::generate();
        self.docs.write().await.push((id, doc));
        Ok(id)
    }

    async fn update_one(
        &self,
        id: ProductId,
        update: &DocumentUpdate,
    ) -> Result<UpdateResult, StoreError> {
        let mut docs = self.docs.write().await;
        match docs.iter_mut().find(|(k, _)| *k == id) {
            Some((_, doc)) => {
                let modified = update.apply(doc);
                Ok(UpdateResult {
                    matched: 1,
                    modified: u64::from(modified),
                })
            }
            None => Ok(UpdateResult::default()),
        }
    }

    async fn delete_one(&self, id: ProductId) -> Result<u64, StoreError> {
        let mut docs = self.docs.write().await;
        let before = docs.len();
        docs.retain(|(k, _)| *k != id);
        Ok((before - docs.len()) as u64)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
