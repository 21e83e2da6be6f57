//! `GET /health`

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::api::types::ApiResponse;
use crate::core::AppState;

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let healthy = state.db.health_check().await.unwrap_or(false);
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    let body = ApiResponse {
        status: status.as_u16(),
        response: json!({
            "status": if healthy { "healthy" } else { "unhealthy" },
            "database": if healthy { "connected" } else { "unavailable" },
            "version": env!("CARGO_PKG_VERSION"),
        }),
    };
    (status, Json(body))
}
