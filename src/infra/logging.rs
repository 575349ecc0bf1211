//! Process-wide logging.
//!
//! Uses `tracing` with an `EnvFilter` (`RUST_LOG`) and the fmt layer.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub const DEFAULT_FILTER: &str = "product_api=debug,api_server=debug,preflight=debug,tower_http=debug";

/// Installs the global subscriber. Calling it twice is harmless; the second call is ignored.
pub fn init() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
