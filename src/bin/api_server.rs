// src/bin/api_server.rs

use product_api::infra::logging;
use product_api::transport;
use product_api::{AppConfig, PostgresProductStore, ProductService};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    // --- Configuration ---
    let config = AppConfig::load()?;
    tracing::info!(
        bind_address = %config.server.bind_address(),
        database = %config.database.name,
        request_timeout_secs = config.server.request_timeout.as_secs(),
        shutdown_grace_secs = config.server.shutdown_grace.as_secs(),
        "Configuration loaded"
    );

    // --- Store Initialization ---
    tracing::info!("Connecting to product store...");
    let store = PostgresProductStore::connect(
        &config.database.connection_string,
        &config.database.name,
        config.database.max_connections,
        config.database.connect_timeout,
    )
    .await?;
    tracing::info!(table = %store.table(), "Product store ready");

    let app_state = transport::http::AppState {
        products: ProductService::new(Arc::new(store)),
    };

    // --- API Server Initialization ---
    let app = transport::http::build_app(app_state, config.server.request_timeout);
    let listener = tokio::net::TcpListener::bind(config.server.bind_address()).await?;
    tracing::info!(
        "Swagger UI available at http://{}/swagger-ui",
        listener.local_addr()?
    );

    transport::http::serve(
        listener,
        app,
        transport::http::shutdown_signal(),
        config.server.shutdown_grace,
    )
    .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
