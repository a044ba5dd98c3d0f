use axum::{Router, routing::get};

pub mod allocations;
pub mod complaints;
pub mod resources;
pub mod system;

/// Router for every endpoint except `/health`.
pub fn router() -> Router {
    Router::new()
        .nest("/resources", resources::router())
        .nest("/complaints", complaints::router())
        .route("/resource-requests", get(allocations::list_pending_requests))
        .route("/allocations", get(allocations::list_allocations))
}
