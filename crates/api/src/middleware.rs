use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{ConnectInfo, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};

use mandra_core::{AuditEntry, DomainError};

use crate::app::{errors, services::AppServices};
use crate::context::{ClientContext, TraceContext};

pub const API_KEY_HEADER: &str = "x-api-key";

/// Generate the per-request trace id before anything else runs.
pub async fn trace_middleware(
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    req.extensions_mut().insert(TraceContext::new());
    next.run(req).await
}

/// Resolve the `X-Api-Key` credential into a `ClientContext`.
///
/// Missing header -> 401. Unknown or inactive key -> 403, per the published
/// interface contract. The resolved context is attached to the request (for
/// handlers) and to the response (for the audit layer).
pub async fn auth_middleware(
    State(services): State<Arc<AppServices>>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let trace_id = req
        .extensions()
        .get::<TraceContext>()
        .map(|t| t.trace_id().to_string())
        .unwrap_or_default();

    let raw_key = req
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    let Some(raw_key) = raw_key else {
        return errors::json_error(
            StatusCode::UNAUTHORIZED,
            "unauthorized",
            "X-Api-Key header is missing",
            &trace_id,
        );
    };

    match services.resolver.resolve(&raw_key).await {
        Ok(client) => {
            let ctx = ClientContext::new(client);
            req.extensions_mut().insert(ctx.clone());
            let mut response = next.run(req).await;
            response.extensions_mut().insert(ctx);
            response
        }
        Err(DomainError::Unauthorized) => {
            tracing::warn!(trace_id = %trace_id, "rejected request with invalid or inactive API key");
            errors::json_error(
                StatusCode::FORBIDDEN,
                "access_denied",
                "invalid or inactive API key",
                &trace_id,
            )
        }
        Err(err) => errors::domain_error_response(&err, &trace_id),
    }
}

/// Record one audit entry per request outcome, whatever the outcome was.
///
/// Health-check traffic is excluded by convention. The recorder swallows its
/// own failures, so this layer can never fail a request.
pub async fn audit_middleware(
    State(services): State<Arc<AppServices>>,
    req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let ip_address = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0.ip().to_string());

    let started = Instant::now();
    let response = next.run(req).await;

    if path.starts_with("/health") {
        return response;
    }

    let client_name = response
        .extensions()
        .get::<ClientContext>()
        .map(|c| c.client_name().to_string());

    let entry = AuditEntry::new(
        client_name,
        method,
        path,
        response.status().as_u16(),
        started.elapsed().as_millis() as i64,
        ip_address,
    );
    services.audit.record(entry).await;

    response
}
