//! Prometheus scrape endpoint.

use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use metrics_exporter_prometheus::PrometheusHandle;

const EXPOSITION_FORMAT: &str = "text/plain; version=0.0.4; charset=utf-8";

/// GET /metrics: renders saga and request counters in the text exposition
/// format.
pub async fn get(State(handle): State<PrometheusHandle>) -> impl IntoResponse {
    ([(CONTENT_TYPE, EXPOSITION_FORMAT)], handle.render())
}
