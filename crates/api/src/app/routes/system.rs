use axum::{response::IntoResponse, Json};
use chrono::Utc;

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "mandra-api",
        "timestamp": Utc::now(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
