//! Health check endpoint.

use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
}

/// GET /health — liveness only; the backend is not probed.
pub async fn check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "storefront-checkout",
    })
}
