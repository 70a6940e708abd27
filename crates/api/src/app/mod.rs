//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: infrastructure wiring (stores, cache, resolver, notifier)
//! - `routes/`: HTTP routes + handlers (one file per domain area)
//! - `dto.rs`: request DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app() -> Router {
    let services = Arc::new(services::build_services().await);
    router_with(services)
}

/// Build the router against pre-wired services (tests inject in-memory
/// stores through this).
pub fn router_with(services: Arc<services::AppServices>) -> Router {
    // Protected routes: require a resolved client identity.
    let protected = routes::router()
        .layer(Extension(services.clone()))
        .layer(axum::middleware::from_fn_with_state(
            services.clone(),
            middleware::auth_middleware,
        ));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(protected)
        .layer(axum::middleware::from_fn_with_state(
            services,
            middleware::audit_middleware,
        ))
        .layer(axum::middleware::from_fn(middleware::trace_middleware))
}
