use axum::Router;

pub mod orders;
pub mod storage;
pub mod system;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .nest("/storage", storage::router())
        .nest("/orders", orders::router())
}
