//! HTTP inventory and payment clients against throwaway local services.

use std::time::Duration;

use axum::{
    Json, Router,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use domain::{ItemNumber, Money, PaymentDetails};
use saga::{
    HttpInventoryClient, HttpPaymentAuthorizer, InventoryClient, OrderError, PaymentAuthorizer,
};
use serde_json::{Value, json};

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

async fn unused_address() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

fn card() -> PaymentDetails {
    PaymentDetails {
        holder_name: "Jane Doe".to_string(),
        card_number: "4111111111111111".to_string(),
        expiry: "12/30".to_string(),
        cvv: "123".to_string(),
    }
}

const TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::test]
async fn inventory_client_reads_snapshot() {
    let base = serve(Router::new().route(
        "/api/inventory",
        get(|| async {
            Json(json!([
                {
                    "itemNumber": 10001,
                    "name": "Laptop 15\"",
                    "description": "High-performance laptop",
                    "availableQuantity": 50,
                    "unitPrice": 999.99
                },
                {
                    "itemNumber": 10005,
                    "name": "USB-C Hub",
                    "availableQuantity": 200,
                    "unitPrice": "49.99"
                }
            ]))
        }),
    ))
    .await;

    let client = HttpInventoryClient::new(&base, TIMEOUT).unwrap();
    let items = client.list_inventory().await.unwrap();

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].item_number, ItemNumber::new(10001));
    assert_eq!(items[0].unit_price, Money::from_cents(99999));
    assert_eq!(items[1].unit_price, Money::from_cents(4999));
    assert_eq!(items[1].description, None);
}

#[tokio::test]
async fn inventory_client_rejects_negative_prices() {
    let base = serve(Router::new().route(
        "/api/inventory",
        get(|| async {
            Json(json!([{
                "itemNumber": 10001,
                "name": "Laptop 15\"",
                "availableQuantity": 50,
                "unitPrice": -999.99
            }]))
        }),
    ))
    .await;

    let client = HttpInventoryClient::new(&base, TIMEOUT).unwrap();
    let err = client.list_inventory().await.unwrap_err();
    assert!(matches!(err, OrderError::UpstreamUnavailable { .. }));
}

#[tokio::test]
async fn inventory_client_maps_server_error_to_upstream() {
    let base = serve(Router::new().route(
        "/api/inventory",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "db down") }),
    ))
    .await;

    let client = HttpInventoryClient::new(&base, TIMEOUT).unwrap();
    let err = client.list_inventory().await.unwrap_err();

    match err {
        OrderError::UpstreamUnavailable { service, reason } => {
            assert_eq!(service, "inventory");
            assert!(reason.contains("db down"));
        }
        other => panic!("expected upstream error, got {other:?}"),
    }
}

#[tokio::test]
async fn inventory_client_unreachable_is_upstream() {
    let client = HttpInventoryClient::new(&unused_address().await, TIMEOUT).unwrap();
    let err = client.list_inventory().await.unwrap_err();
    assert!(matches!(err, OrderError::UpstreamUnavailable { .. }));
}

#[tokio::test]
async fn payment_authorizer_sends_card_and_reads_token() {
    let base = serve(Router::new().route(
        "/payment",
        post(|Json(body): Json<Value>| async move {
            if body["amount"] == json!(1999.98)
                && body["holderName"] == "Jane Doe"
                && body["cardNum"] == "4111111111111111"
                && body["expDate"] == "12/30"
                && body["cvv"] == "123"
            {
                Json(json!({"paymentToken": "tok_abc"})).into_response()
            } else {
                (StatusCode::BAD_REQUEST, "unexpected body").into_response()
            }
        }),
    ))
    .await;

    let authorizer = HttpPaymentAuthorizer::new(&base, TIMEOUT).unwrap();
    let token = authorizer
        .authorize(Money::from_cents(199998), &card())
        .await
        .unwrap();

    assert_eq!(token.as_str(), "tok_abc");
}

#[tokio::test]
async fn payment_rejection_is_declined_with_service_message() {
    let base = serve(Router::new().route(
        "/payment",
        post(|| async { (StatusCode::PAYMENT_REQUIRED, "insufficient funds") }),
    ))
    .await;

    let authorizer = HttpPaymentAuthorizer::new(&base, TIMEOUT).unwrap();
    let err = authorizer
        .authorize(Money::from_cents(100), &card())
        .await
        .unwrap_err();

    assert!(matches!(err, OrderError::PaymentDeclined(ref reason) if reason == "insufficient funds"));
    assert_eq!(err.public_message(), "Payment failed: insufficient funds");
}

#[tokio::test]
async fn payment_without_token_is_declined() {
    let base = serve(Router::new().route(
        "/payment",
        post(|| async { Json(json!({"status": "ok"})) }),
    ))
    .await;

    let authorizer = HttpPaymentAuthorizer::new(&base, TIMEOUT).unwrap();
    let err = authorizer
        .authorize(Money::from_cents(100), &card())
        .await
        .unwrap_err();

    assert!(matches!(err, OrderError::PaymentDeclined(_)));
}

#[tokio::test]
async fn payment_unreachable_is_upstream() {
    let authorizer = HttpPaymentAuthorizer::new(&unused_address().await, TIMEOUT).unwrap();
    let err = authorizer
        .authorize(Money::from_cents(100), &card())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        OrderError::UpstreamUnavailable {
            service: "payment",
            ..
        }
    ));
}
