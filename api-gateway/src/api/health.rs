//! Liveness and service metadata handlers

use std::sync::Arc;
use std::time::Instant;

use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};
use tracing::warn;
use utoipa::openapi::OpenApi as OpenApiDocument;
use utoipa::OpenApi;

use crate::api::response::MessageResponse;
use crate::{ApiDoc, AppState};

/// Liveness probe
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service is up", body = MessageResponse)
    ),
    tag = "health"
)]
pub async fn root() -> MessageResponse {
    MessageResponse::new("Trion backend")
}

/// Detailed health including the store round trip
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Store reachable"),
        (status = 503, description = "Store unreachable")
    ),
    tag = "health"
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Value>) {
    let started = Instant::now();
    let store = state.account_service.ping().await;
    let latency_ms = started.elapsed().as_millis() as u64;

    let (status, store_status) = match &store {
        Ok(()) => (StatusCode::OK, "up"),
        Err(e) => {
            warn!("Health check failed: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, "down")
        }
    };

    let body = json!({
        "ok": store.is_ok(),
        "status": if store.is_ok() { "healthy" } else { "degraded" },
        "version": env!("CARGO_PKG_VERSION"),
        "uptimeSeconds": state.started_at.elapsed().as_secs(),
        "store": {
            "status": store_status,
            "latencyMs": latency_ms,
        },
    });

    (status, Json(body))
}

/// OpenAPI document for the HTTP API
pub async fn openapi_json() -> Json<OpenApiDocument> {
    Json(ApiDoc::openapi())
}
