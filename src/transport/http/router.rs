use crate::domain::product::{Product, ProductPatch};
use crate::transport::http::handlers::{health, products};
use crate::transport::http::types::{ApiResponse, AppState};
use axum::routing::get;
use axum::Router;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthcheck_handler,
        products::get_products_handler,
        products::get_product_handler,
        products::add_product_handler,
        products::update_product_handler,
        products::delete_product_handler
    ),
    components(schemas(ApiResponse, Product, ProductPatch))
)]
pub struct ApiDoc;

/// Routes only: exact verb + path, one `id` parameter on item routes.
pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(products::root_redirect_handler))
        .route("/health", get(health::healthcheck_handler))
        .route(
            "/products",
            get(products::get_products_handler).post(products::add_product_handler),
        )
        .route(
            "/products/:id",
            get(products::get_product_handler)
                .put(products::update_product_handler)
                .delete(products::delete_product_handler),
        )
        .with_state(app_state)
}

/// The full application: routes, API docs, and the timeout/tracing/CORS layers.
pub fn build_app(app_state: AppState, request_timeout: Duration) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any);
    create_router(app_state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
