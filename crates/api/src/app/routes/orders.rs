use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    routing::post,
    Json, Router,
};
use rust_decimal::Decimal;

use mandra_auth::{require_scope, Scope};
use mandra_core::OrderId;

use crate::app::{dto, errors};
use crate::app::services::AppServices;
use crate::context::{ClientContext, TraceContext};

fn orders_read() -> Scope {
    Scope::new("orders:read")
}

fn orders_write() -> Scope {
    Scope::new("orders:write")
}

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_order).get(list_orders))
        .route("/:id", get(get_order))
}

pub async fn create_order(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(client): Extension<ClientContext>,
    Extension(trace): Extension<TraceContext>,
    Json(body): Json<dto::CreateOrderRequest>,
) -> axum::response::Response {
    if let Err(e) = require_scope(client.client(), &orders_write()) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string(), trace.trace_id());
    }

    // Fast request-shape checks; the manager re-validates business rules
    // before anything is written.
    if body.lines.is_empty() {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "invalid_argument",
            "at least one order line is required",
            trace.trace_id(),
        );
    }
    for line in &body.lines {
        if line.quantity <= Decimal::ZERO {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "invalid_argument",
                format!("quantity for '{}' must be greater than zero", line.material_code),
                trace.trace_id(),
            );
        }
    }

    let request = body.into_new_order();

    // Run on a detached task: a client disconnect drops this handler future,
    // but the insert must run to completion once issued, and the committed
    // result must still be recorded.
    let creator = services.clone();
    let identity = client.client().clone();
    let created =
        tokio::spawn(async move { creator.orders.create_order(&request, &identity).await }).await;

    let result = match created {
        Ok(result) => result,
        Err(e) => {
            tracing::error!(trace_id = %trace.trace_id(), error = %e, "order creation task failed");
            return errors::json_error(
                StatusCode::SERVICE_UNAVAILABLE,
                "unavailable",
                "service temporarily unavailable",
                trace.trace_id(),
            );
        }
    };

    match result {
        Ok(order) => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "success": true,
                "data": dto::purchase_order_to_json(&order),
            })),
        )
            .into_response(),
        Err(e) => errors::domain_error_response(&e, trace.trace_id()),
    }
}

pub async fn get_order(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(client): Extension<ClientContext>,
    Extension(trace): Extension<TraceContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(e) = require_scope(client.client(), &orders_read()) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string(), trace.trace_id());
    }

    let order_id: OrderId = match id.parse() {
        Ok(id) => id,
        Err(_) => {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "invalid_argument",
                "invalid order id",
                trace.trace_id(),
            );
        }
    };

    match services.orders.get_order(order_id).await {
        Ok(Some(order)) => {
            // Multi-tenant isolation: a client never sees another client's
            // orders.
            if order.source_application != client.client_name() {
                return errors::json_error(
                    StatusCode::FORBIDDEN,
                    "forbidden",
                    "order belongs to another client",
                    trace.trace_id(),
                );
            }
            (
                StatusCode::OK,
                Json(serde_json::json!({
                    "success": true,
                    "data": dto::purchase_order_to_json(&order),
                })),
            )
                .into_response()
        }
        Ok(None) => errors::json_error(
            StatusCode::NOT_FOUND,
            "not_found",
            "order not found",
            trace.trace_id(),
        ),
        Err(e) => errors::domain_error_response(&e, trace.trace_id()),
    }
}

pub async fn list_orders(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(client): Extension<ClientContext>,
    Extension(trace): Extension<TraceContext>,
    Query(query): Query<dto::ListOrdersQuery>,
) -> axum::response::Response {
    if let Err(e) = require_scope(client.client(), &orders_read()) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string(), trace.trace_id());
    }

    match services
        .orders
        .list_orders_by_source(client.client_name(), query.page, query.page_size)
        .await
    {
        Ok((page, page_size, orders)) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "success": true,
                "page": page,
                "pageSize": page_size,
                "count": orders.len(),
                "data": orders.iter().map(dto::purchase_order_to_json).collect::<Vec<_>>(),
            })),
        )
            .into_response(),
        Err(e) => errors::domain_error_response(&e, trace.trace_id()),
    }
}
