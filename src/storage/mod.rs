pub mod memory;
pub mod postgres;
pub mod store;

pub use memory::MemoryProductStore;
pub use postgres::{validate_ident, PostgresProductStore};
pub use store::{Document, ProductStore, StoreError, UpdateResult};
