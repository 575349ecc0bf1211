use crate::app::product_service::{ProductError, ProductService};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::Value as JsonValue;
use utoipa::ToSchema;

/// Shared by every handler. The service holds the single long-lived store handle.
#[derive(Clone)]
pub struct AppState {
    pub products: ProductService,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub data: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ApiResponse {
            success: false,
            data: None,
            error: Some(message.into()),
        }),
    )
        .into_response()
}

pub const INVALID_ID: &str = "Invalid id.";
pub const INVALID_PRODUCT: &str = "Product is invalid.";
pub const ID_NOT_ALLOWED: &str = "Product id must be null or empty.";
pub const ID_IMMUTABLE: &str = "Product id cannot be changed.";
pub const NOT_FOUND: &str = "The requested resource was not found.";
pub const NOT_FOUND_DELETE: &str = "The requested resource was not found, impossible to delete.";
pub const INTERNAL_ERROR: &str = "Internal server error.";

/// Maps a data-access failure to a status. Store errors were already logged by the service.
pub fn product_error_response(err: &ProductError) -> Response {
    match err {
        ProductError::NotFound(_) => error_response(StatusCode::NOT_FOUND, NOT_FOUND),
        ProductError::NotModified(_) => {
            error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
        ProductError::Store(_) => error_response(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR),
    }
}
