pub mod extract;
pub mod router;
pub mod server;
pub mod types;
pub mod handlers {
    pub mod health;
    pub mod products;
}

pub use router::{build_app, create_router, ApiDoc};
pub use server::{serve, shutdown_signal};
pub use types::AppState;
