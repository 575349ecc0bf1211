pub mod app;
pub mod domain;
pub mod infra;
pub mod storage;
pub mod transport;

// Convenience re-exports (keeps call-sites clean)
pub use app::product_service::{ProductError, ProductService};
pub use domain::product::{Product, ProductId, ProductPatch};
pub use infra::config::AppConfig;
pub use storage::{MemoryProductStore, PostgresProductStore, ProductStore};
