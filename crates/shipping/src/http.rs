//! Push endpoint for bus deliveries.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use event_bus::BusEvent;
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::{HandleOutcome, ShippingConsumer, ShippingError, store::ShipmentStore};

/// Builds the consumer's router: `POST /events` and `GET /health`.
///
/// A 503 answer tells the sender to redeliver; 400 means redelivery will
/// not help.
pub fn router<S: ShipmentStore + 'static>(consumer: Arc<ShippingConsumer<S>>) -> Router {
    Router::new()
        .route("/events", post(receive::<S>))
        .route("/health", get(health))
        .with_state(consumer)
        .layer(TraceLayer::new_for_http())
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn receive<S: ShipmentStore + 'static>(
    State(consumer): State<Arc<ShippingConsumer<S>>>,
    Json(event): Json<BusEvent>,
) -> Response {
    match consumer.handle(&event).await {
        Ok(HandleOutcome::Recorded(order_id)) => (
            StatusCode::OK,
            Json(json!({ "outcome": "recorded", "orderId": order_id })),
        )
            .into_response(),
        Ok(HandleOutcome::Ignored) => {
            (StatusCode::OK, Json(json!({ "outcome": "ignored" }))).into_response()
        }
        Err(err) => {
            let status = match &err {
                ShippingError::Decode(_) => StatusCode::BAD_REQUEST,
                _ if err.is_retryable() => StatusCode::SERVICE_UNAVAILABLE,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            metrics::counter!("shipment_handle_failures_total").increment(1);
            tracing::warn!(event_id = %event.id, %status, error = %err, "event not recorded");
            (status, Json(json!({ "error": err.to_string() }))).into_response()
        }
    }
}
