use crate::app::product_service::ProductError;
use crate::domain::product::{Product, ProductPatch};
use crate::transport::http::extract::{parse_product_id, ValidJson};
use crate::transport::http::types::{
    error_response, product_error_response, AppState, ID_IMMUTABLE, ID_NOT_ALLOWED, NOT_FOUND_DELETE,
};
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;

/// `GET /` sends clients to the collection.
pub async fn root_redirect_handler() -> impl IntoResponse {
    (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, "/products")])
}

#[utoipa::path(
    get,
    path = "/products",
    responses(
        (status = 200, description = "All products (possibly empty)", body = [Product]),
        (status = 500, description = "Internal server error", body = ApiResponse)
    )
)]
pub async fn get_products_handler(State(state): State<AppState>) -> impl IntoResponse {
    tracing::info!("Handle GET Products");

    match state.products.list_products().await {
        Ok(products) => (StatusCode::OK, Json(products)).into_response(),
        Err(e) => product_error_response(&e),
    }
}

#[utoipa::path(
    get,
    path = "/products/{id}",
    params(
        ("id" = String, Path, description = "Product id (24 hex characters)")
    ),
    responses(
        (status = 200, description = "The product", body = Product),
        (status = 400, description = "Malformed id", body = ApiResponse),
        (status = 404, description = "No product with this id", body = ApiResponse),
        (status = 500, description = "Internal server error", body = ApiResponse)
    )
)]
pub async fn get_product_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    tracing::info!(id = %id, "Handle GET Product");

    let id = match parse_product_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match state.products.get_product(id).await {
        Ok(product) => (StatusCode::OK, Json(product)).into_response(),
        Err(e) => product_error_response(&e),
    }
}

#[utoipa::path(
    post,
    path = "/products",
    request_body = Product,
    responses(
        (status = 201, description = "Created; body is the new id as plain text", body = String, content_type = "text/plain"),
        (status = 400, description = "Invalid body or id supplied", body = ApiResponse),
        (status = 500, description = "Internal server error", body = ApiResponse)
    )
)]
pub async fn add_product_handler(
    State(state): State<AppState>,
    ValidJson(product): ValidJson<Product>,
) -> impl IntoResponse {
    tracing::info!("Handle POST Product");

    if product.id.is_some() {
        return error_response(StatusCode::BAD_REQUEST, ID_NOT_ALLOWED);
    }

    match state.products.create_product(&product).await {
        Ok(id) => (
            StatusCode::CREATED,
            [
                (header::CONTENT_TYPE, "text/plain".to_string()),
                (header::LOCATION, format!("/products/{}", id)),
            ],
            id.to_hex(),
        )
            .into_response(),
        Err(e) => product_error_response(&e),
    }
}

#[utoipa::path(
    put,
    path = "/products/{id}",
    params(
        ("id" = String, Path, description = "Product id (24 hex characters)")
    ),
    request_body = ProductPatch,
    responses(
        (status = 200, description = "Updated"),
        (status = 400, description = "Malformed id or body", body = ApiResponse),
        (status = 404, description = "No product with this id", body = ApiResponse),
        (status = 500, description = "Update changed nothing, or store failure", body = ApiResponse)
    )
)]
pub async fn update_product_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidJson(patch): ValidJson<ProductPatch>,
) -> impl IntoResponse {
    tracing::info!(id = %id, "Handle PUT Product");

    let id = match parse_product_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    if patch.id.is_some_and(|body_id| body_id != id) {
        return error_response(StatusCode::BAD_REQUEST, ID_IMMUTABLE);
    }
    let sets_nothing = patch.is_empty();

    match state.products.update_product(id, patch).await {
        Ok(()) => StatusCode::OK.into_response(),
        Err(e) => {
            if let ProductError::NotModified(_) = e {
                tracing::warn!(id = %id, sets_nothing, "update left product unchanged");
            }
            product_error_response(&e)
        }
    }
}

#[utoipa::path(
    delete,
    path = "/products/{id}",
    params(
        ("id" = String, Path, description = "Product id (24 hex characters)")
    ),
    responses(
        (status = 200, description = "Deleted; body is `Objects deleted: N`", body = String, content_type = "text/plain"),
        (status = 400, description = "Malformed id", body = ApiResponse),
        (status = 404, description = "Nothing deleted", body = ApiResponse),
        (status = 500, description = "Internal server error", body = ApiResponse)
    )
)]
pub async fn delete_product_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    tracing::info!(id = %id, "Handle DELETE Product");

    let id = match parse_product_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match state.products.delete_product(id).await {
        Ok(0) => error_response(StatusCode::NOT_FOUND, NOT_FOUND_DELETE),
        Ok(deleted) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/plain"),
                (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
            ],
            format!("Objects deleted: {}", deleted),
        )
            .into_response(),
        Err(e) => product_error_response(&e),
    }
}
