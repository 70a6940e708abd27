use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use mandra_core::DomainError;

/// Build the structured error body every endpoint shares:
/// `{error, detail, traceId}`.
pub fn json_error(
    status: StatusCode,
    code: &'static str,
    detail: impl Into<String>,
    trace_id: &str,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "detail": detail.into(),
            "traceId": trace_id,
        })),
    )
        .into_response()
}

/// Map a domain error onto the HTTP taxonomy.
pub fn domain_error_response(err: &DomainError, trace_id: &str) -> axum::response::Response {
    match err {
        DomainError::Unauthorized => json_error(
            StatusCode::UNAUTHORIZED,
            "unauthorized",
            "credential missing or unresolvable",
            trace_id,
        ),
        DomainError::Forbidden(detail) => {
            json_error(StatusCode::FORBIDDEN, "forbidden", detail.clone(), trace_id)
        }
        DomainError::InvalidArgument(detail) => json_error(
            StatusCode::BAD_REQUEST,
            "invalid_argument",
            detail.clone(),
            trace_id,
        ),
        DomainError::NotFound => {
            json_error(StatusCode::NOT_FOUND, "not_found", "not found", trace_id)
        }
        DomainError::Conflict(detail) => {
            json_error(StatusCode::CONFLICT, "conflict", detail.clone(), trace_id)
        }
        DomainError::Unavailable(detail) => {
            tracing::error!(trace_id = %trace_id, detail = %detail, "store failure surfaced to client");
            json_error(
                StatusCode::SERVICE_UNAVAILABLE,
                "unavailable",
                "service temporarily unavailable",
                trace_id,
            )
        }
    }
}
