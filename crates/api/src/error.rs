//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use event_bus::BusError;
use order_store::StoreError;
use saga::{ErrorKind, Fault, OrderError};
use serde::Serialize;
use shipping::ShippingError;
use thiserror::Error;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Order placement or lookup failed.
    Order(OrderError),
    /// The request could not be parsed.
    BadRequest(String),
    /// Resource not found.
    NotFound(String),
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    kind: &'a str,
    message: String,
}

/// HTTP status for an order error kind.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::ItemNotFound | ErrorKind::InsufficientStock => StatusCode::CONFLICT,
        ErrorKind::PaymentDeclined => StatusCode::PAYMENT_REQUIRED,
        ErrorKind::UpstreamUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::Persistence => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match self {
            ApiError::Order(err) => {
                if err.fault() == Fault::Server {
                    tracing::error!(error = %err, "order request failed");
                }
                (
                    status_for(err.kind()),
                    err.kind().as_str(),
                    err.public_message(),
                )
            }
            ApiError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorKind::Validation.as_str(),
                msg,
            ),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NotFound", msg),
        };

        (status, axum::Json(ErrorBody { kind, message })).into_response()
    }
}

impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
        ApiError::Order(err)
    }
}

/// Errors that prevent the server from starting.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Database connection failed: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Order store error: {0}")]
    Store(#[from] StoreError),

    #[error("HTTP client setup failed: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Event bus setup failed: {0}")]
    Bus(#[from] BusError),

    #[error("Shipment store error: {0}")]
    Shipping(#[from] ShippingError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(ErrorKind::Validation), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorKind::ItemNotFound), StatusCode::CONFLICT);
        assert_eq!(status_for(ErrorKind::InsufficientStock), StatusCode::CONFLICT);
        assert_eq!(
            status_for(ErrorKind::PaymentDeclined),
            StatusCode::PAYMENT_REQUIRED
        );
        assert_eq!(
            status_for(ErrorKind::UpstreamUnavailable),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_for(ErrorKind::Persistence),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_persistence_body_hides_details() {
        let err = ApiError::Order(OrderError::Persistence(StoreError::Unavailable(
            "pool timed out".to_string(),
        )));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["kind"], "Persistence");
        assert!(!json["message"].as_str().unwrap().contains("pool timed out"));
    }
}
