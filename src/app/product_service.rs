//! The Product data access layer.
//!
//! This module sits between the HTTP handlers and the document store.
//! It is responsible for:
//! 1.  Translating between `Product` / `ProductPatch` and stored documents.
//! 2.  Turning store results into `ProductError` (absent, unchanged, store failure).
//! 3.  Logging every store failure once, here, so handlers only map errors to statuses.
//!
//! Each operation is exactly one store call; there is no caching and nothing is retried.

use crate::domain::product::{DocumentUpdate, Product, ProductId, ProductPatch};
use crate::storage::{ProductStore, StoreError};
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum ProductError {
    #[error("product {0} not found")]
    NotFound(ProductId),
    #[error("Failed to update product with id = {0}")]
    NotModified(ProductId),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Cloneable handle over the shared store.
#[derive(Clone)]
pub struct ProductService {
    store: Arc<dyn ProductStore>,
}

impl ProductService {
    pub fn new(store: Arc<dyn ProductStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn ProductStore> {
        &self.store
    }

    /// Returns every stored product. Order is not part of the contract.
    pub async fn list_products(&self) -> Result<Vec<Product>, ProductError> {
        let docs = self.store.find_all().await.map_err(log_store_error)?;
        docs.into_iter()
            .map(|(id, doc)| decode(id, doc))
            .collect()
    }

    pub async fn get_product(&self, id: ProductId) -> Result<Product, ProductError> {
        match self.store.find_one(id).await.map_err(log_store_error)? {
            Some(doc) => decode(id, doc),
            None => Err(ProductError::NotFound(id)),
        }
    }

    /// Inserts `product` and returns the id the store assigned.
    ///
    /// A client-supplied id is never written; callers that must reject one do so before this.
    pub async fn create_product(&self, product: &Product) -> Result<ProductId, ProductError> {
        let id = self
            .store
            .insert_one(product.to_document())
            .await
            .map_err(log_store_error)?;
        tracing::debug!(id = %id, "product inserted");
        Ok(id)
    }

    /// Applies a sparse update.
    ///
    /// Fails with `NotFound` when no product has `id`, and with `NotModified` when the
    /// product exists but the patch leaves it unchanged.
    pub async fn update_product(&self, id: ProductId, patch: ProductPatch) -> Result<(), ProductError> {
        let update = DocumentUpdate::from(patch);
        let result = self
            .store
            .update_one(id, &update)
            .await
            .map_err(log_store_error)?;

        if result.matched == 0 {
            return Err(ProductError::NotFound(id));
        }
        if result.modified == 0 {
            return Err(ProductError::NotModified(id));
        }
        Ok(())
    }

    /// Deletes at most one product. Returns 0 when nothing matched.
    pub async fn delete_product(&self, id: ProductId) -> Result<u64, ProductError> {
        let deleted = self.store.delete_one(id).await.map_err(log_store_error)?;
        Ok(deleted)
    }
}

fn decode(id: ProductId, doc: crate::storage::Document) -> Result<Product, ProductError> {
    Product::from_document(id, doc).map_err(|e| {
        log_store_error(StoreError::Corrupt(format!("product {}: {}", id, e))).into()
    })
}

fn log_store_error(e: StoreError) -> StoreError {
    tracing::error!(error = %e, "product store call failed");
    e
}
