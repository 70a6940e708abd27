use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use mandra_auth::{require_scope, Scope};
use mandra_infra::read_store::DEFAULT_EXPIRY_WINDOW_DAYS;

use crate::app::{dto, errors};
use crate::app::services::AppServices;
use crate::context::{ClientContext, TraceContext};

fn storage_read() -> Scope {
    Scope::new("storage:read")
}

pub fn router() -> Router {
    Router::new()
        .route("/items", get(list_items))
        .route("/items/:material_code", get(get_item))
        .route("/summary", get(get_summary))
        .route("/available-space", get(get_available_space))
        .route("/expiring", get(get_expiring))
}

pub async fn list_items(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(client): Extension<ClientContext>,
    Extension(trace): Extension<TraceContext>,
) -> axum::response::Response {
    if let Err(e) = require_scope(client.client(), &storage_read()) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string(), trace.trace_id());
    }

    match services.reads.list_active_items().await {
        Ok(items) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "success": true,
                "count": items.len(),
                "data": items.iter().map(dto::stock_item_to_json).collect::<Vec<_>>(),
            })),
        )
            .into_response(),
        Err(e) => errors::domain_error_response(&e, trace.trace_id()),
    }
}

pub async fn get_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(client): Extension<ClientContext>,
    Extension(trace): Extension<TraceContext>,
    Path(material_code): Path<String>,
) -> axum::response::Response {
    if let Err(e) = require_scope(client.client(), &storage_read()) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string(), trace.trace_id());
    }

    match services.reads.item_by_code(&material_code).await {
        Ok(Some(item)) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "success": true,
                "data": dto::stock_item_to_json(&item),
            })),
        )
            .into_response(),
        Ok(None) => errors::json_error(
            StatusCode::NOT_FOUND,
            "not_found",
            format!("no active material with code '{material_code}'"),
            trace.trace_id(),
        ),
        Err(e) => errors::domain_error_response(&e, trace.trace_id()),
    }
}

pub async fn get_summary(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(client): Extension<ClientContext>,
    Extension(trace): Extension<TraceContext>,
) -> axum::response::Response {
    if let Err(e) = require_scope(client.client(), &storage_read()) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string(), trace.trace_id());
    }

    match services.reads.summary().await {
        Ok(summary) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "success": true,
                "data": dto::storage_summary_to_json(&summary),
            })),
        )
            .into_response(),
        Err(e) => errors::domain_error_response(&e, trace.trace_id()),
    }
}

pub async fn get_available_space(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(client): Extension<ClientContext>,
    Extension(trace): Extension<TraceContext>,
) -> axum::response::Response {
    if let Err(e) = require_scope(client.client(), &storage_read()) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string(), trace.trace_id());
    }

    match services.reads.available_space().await {
        Ok(space) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "success": true,
                "data": dto::available_space_to_json(&space),
            })),
        )
            .into_response(),
        Err(e) => errors::domain_error_response(&e, trace.trace_id()),
    }
}

pub async fn get_expiring(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(client): Extension<ClientContext>,
    Extension(trace): Extension<TraceContext>,
    Query(query): Query<dto::ExpiringQuery>,
) -> axum::response::Response {
    if let Err(e) = require_scope(client.client(), &storage_read()) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string(), trace.trace_id());
    }

    let days_ahead = query.days_ahead.unwrap_or(DEFAULT_EXPIRY_WINDOW_DAYS);

    match services.reads.expiring(days_ahead).await {
        Ok(items) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "success": true,
                "count": items.len(),
                "filterDaysAhead": days_ahead,
                "data": items.iter().map(dto::expiring_item_to_json).collect::<Vec<_>>(),
            })),
        )
            .into_response(),
        Err(e) => errors::domain_error_response(&e, trace.trace_id()),
    }
}
