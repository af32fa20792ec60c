//! HTTP publisher tests against a throwaway local endpoint.

use std::sync::Arc;
use std::time::Duration;

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use event_bus::{BusError, BusEvent, EventPublisher, HttpEventPublisher};
use tokio::sync::Mutex;

type Received = Arc<Mutex<Vec<BusEvent>>>;

async fn spawn_endpoint(status: StatusCode) -> (String, Received) {
    let received: Received = Arc::default();
    let app = Router::new()
        .route(
            "/events",
            post(
                move |State(received): State<Received>, Json(event): Json<BusEvent>| async move {
                    received.lock().await.push(event);
                    status
                },
            ),
        )
        .with_state(received.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}/events"), received)
}

fn order_created() -> BusEvent {
    BusEvent::new(
        "order-service",
        "OrderCreated",
        &serde_json::json!({"orderId": 1, "packetCount": 1}),
    )
    .unwrap()
}

#[tokio::test]
async fn posts_envelope_as_json() {
    let (url, received) = spawn_endpoint(StatusCode::OK).await;
    let publisher = HttpEventPublisher::new(url, Duration::from_secs(5)).unwrap();
    let event = order_created();

    publisher.publish(&event).await.unwrap();

    let received = received.lock().await;
    assert_eq!(received.len(), 1);
    assert_eq!(received[0], event);
}

#[tokio::test]
async fn non_success_status_is_rejected() {
    let (url, _received) = spawn_endpoint(StatusCode::SERVICE_UNAVAILABLE).await;
    let publisher = HttpEventPublisher::new(url, Duration::from_secs(5)).unwrap();

    let result = publisher.publish(&order_created()).await;

    assert!(matches!(result, Err(BusError::Rejected { status: 503 })));
}

#[tokio::test]
async fn unreachable_endpoint_is_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let publisher =
        HttpEventPublisher::new(format!("http://{addr}/events"), Duration::from_secs(2)).unwrap();

    let result = publisher.publish(&order_created()).await;

    assert!(matches!(result, Err(BusError::Transport(_))));
}
