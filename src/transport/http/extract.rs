//! Request validation for POST/PUT bodies.
//!
//! `ValidJson<T>` reads the whole body, decodes it once into `T` and hands it to the
//! handler. Any failure answers 400 before the handler runs. The `Content-Type` header
//! is not inspected.

use crate::domain::product::{self, ProductId};
use crate::transport::http::types::{error_response, INVALID_ID, INVALID_PRODUCT};
use axum::async_trait;
use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::response::Response;
use serde::de::DeserializeOwned;

#[derive(Debug, Clone)]
pub struct ValidJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = Bytes::from_request(req, state).await.map_err(|e| {
            tracing::debug!(error = %e, "failed to read request body");
            error_response(StatusCode::BAD_REQUEST, INVALID_PRODUCT)
        })?;

        product::from_json::<T>(&body).map(ValidJson).map_err(|e| {
            tracing::debug!(error = %e, "rejected request body");
            error_response(StatusCode::BAD_REQUEST, INVALID_PRODUCT)
        })
    }
}

/// Parses a path id, answering 400 for anything that is not a well-formed id.
pub fn parse_product_id(raw: &str) -> Result<ProductId, Response> {
    ProductId::parse(raw).map_err(|e| {
        tracing::debug!(error = %e, "rejected product id");
        error_response(StatusCode::BAD_REQUEST, INVALID_ID)
    })
}
