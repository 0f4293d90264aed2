//! Health Check API Handlers
//!
//! Liveness and identity endpoints for monitoring.

use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::{Value, json};

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// GET /
/// Service name and version
pub async fn service_info() -> Json<Value> {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
