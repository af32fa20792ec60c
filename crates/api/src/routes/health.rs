//! Liveness endpoint.

use axum::Json;
use domain::ORDER_SERVICE_SOURCE;
use serde::Serialize;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
}

/// GET /health: reports that the order service is up.
pub async fn check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: ORDER_SERVICE_SOURCE,
    })
}
