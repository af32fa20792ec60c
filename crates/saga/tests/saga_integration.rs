//! Integration tests for the order placement saga.

use domain::{
    ItemNumber, LineItemRequest, Money, NumericInput, ORDER_CREATED, OrderCreatedDetail,
    OrderRequest, PaymentInfoRequest, ShippingInfoRequest, ValidationError,
};
use event_bus::RecordingPublisher;
use order_store::{FailPoint, InMemoryOrderStore, OrderStore, OrderStoreExt, RowCounts};
use saga::{
    ErrorKind, InMemoryInventoryClient, OrderError, OrderOrchestrator, SagaSettings,
    StoreInventoryClient, StubPaymentAuthorizer,
};

type TestOrchestrator = OrderOrchestrator<
    InMemoryInventoryClient,
    StubPaymentAuthorizer,
    InMemoryOrderStore,
    RecordingPublisher,
>;

struct TestHarness {
    orchestrator: TestOrchestrator,
    inventory: InMemoryInventoryClient,
    payment: StubPaymentAuthorizer,
    store: InMemoryOrderStore,
    publisher: RecordingPublisher,
}

fn catalog(laptops: u32) -> Vec<domain::InventoryRecord> {
    vec![
        domain::InventoryRecord::new(10001, "Laptop 15\"", Money::from_cents(99999), laptops),
        domain::InventoryRecord::new(10002, "Wireless Mouse", Money::from_cents(2999), 100),
    ]
}

impl TestHarness {
    async fn new(laptops: u32) -> Self {
        let inventory = InMemoryInventoryClient::new(catalog(laptops));
        let payment = StubPaymentAuthorizer::new();
        let store = InMemoryOrderStore::with_inventory(catalog(laptops)).await;
        let publisher = RecordingPublisher::new();

        let orchestrator = OrderOrchestrator::new(
            inventory.clone(),
            payment.clone(),
            store.clone(),
            publisher.clone(),
            SagaSettings::default(),
        );

        Self {
            orchestrator,
            inventory,
            payment,
            store,
            publisher,
        }
    }

    async fn laptops_available(&self) -> Option<u32> {
        self.store
            .available_quantity(ItemNumber::new(10001))
            .await
            .unwrap()
    }
}

fn jane_doe(items: Vec<LineItemRequest>) -> OrderRequest {
    OrderRequest {
        customer_name: Some("Jane Doe".to_string()),
        customer_email: Some("jane@example.com".to_string()),
        status: None,
        payment_info: Some(PaymentInfoRequest {
            holder_name: Some("Jane Doe".to_string()),
            card_num: Some("4111111111111111".to_string()),
            exp_date: Some("12/30".to_string()),
            cvv: Some("123".to_string()),
        }),
        shipping_info: Some(ShippingInfoRequest {
            address1: Some("1 Main St".to_string()),
            address2: None,
            city: Some("Springfield".to_string()),
            state: Some("IL".to_string()),
            country: Some("US".to_string()),
            postal_code: Some("62701".to_string()),
            email: None,
        }),
        items,
    }
}

#[tokio::test]
async fn test_happy_path_places_order() {
    let h = TestHarness::new(50).await;

    let confirmation = h
        .orchestrator
        .create_order(jane_doe(vec![LineItemRequest::new(10001, 2)]))
        .await
        .unwrap();

    assert_eq!(confirmation.total_amount, Money::from_cents(199998));
    assert_eq!(confirmation.payment_token.as_str(), "PAY-0001");
    assert_eq!(h.laptops_available().await, Some(48));

    let order = h
        .store
        .get_order(confirmation.order_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(order.line_items.len(), 1);
    assert_eq!(order.line_items[0].quantity, 2);
    assert_eq!(order.line_items[0].item_name, "Laptop 15\"");
    assert_eq!(order.payment_token, "PAY-0001");
    assert_eq!(order.total_amount, Money::from_cents(199998));

    let detail = &confirmation.shipping_detail;
    assert_eq!(detail.order_id, confirmation.order_id);
    assert_eq!(detail.business_id, "demo-store");
    assert_eq!(detail.packet_count, 1);
    assert_eq!(detail.packets[0].packet_weight, 2.0);
}

#[tokio::test]
async fn test_total_uses_snapshot_prices_only() {
    let h = TestHarness::new(50).await;
    // Price drop in the inventory service is honored even though the local
    // table still carries the old price.
    let mut cheaper = catalog(50);
    cheaper[0].unit_price = Money::from_cents(89999);
    h.inventory.set_items(cheaper).await;

    let confirmation = h
        .orchestrator
        .create_order(jane_doe(vec![
            LineItemRequest::new(10001, 1),
            LineItemRequest::new(10002, 3),
        ]))
        .await
        .unwrap();

    assert_eq!(confirmation.total_amount, Money::from_cents(89999 + 3 * 2999));
    assert_eq!(
        h.payment.authorized_amounts().await,
        vec![Money::from_cents(98996)]
    );
}

#[tokio::test]
async fn test_validation_fails_before_any_call() {
    let h = TestHarness::new(50).await;
    let mut request = jane_doe(vec![LineItemRequest::new(10001, 1)]);
    request.payment_info.as_mut().unwrap().cvv = Some("  ".to_string());

    let err = h.orchestrator.create_order(request).await.unwrap_err();

    match err {
        OrderError::Validation(ValidationError::Required { field }) => {
            assert_eq!(field, "paymentInfo.cvv");
        }
        other => panic!("expected validation error, got {other:?}"),
    }
    assert_eq!(h.inventory.call_count().await, 0);
    assert_eq!(h.payment.call_count().await, 0);
}

#[tokio::test]
async fn test_non_integer_quantity_is_rejected() {
    let h = TestHarness::new(50).await;
    let request = jane_doe(vec![LineItemRequest {
        item_number: Some(NumericInput::Integer(10001)),
        quantity: Some(NumericInput::Float(1.5)),
    }]);

    let err = h.orchestrator.create_order(request).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.to_string(), "items[0].quantity must be a positive integer");
}

#[tokio::test]
async fn test_unknown_item_writes_nothing() {
    let h = TestHarness::new(50).await;

    let err = h
        .orchestrator
        .create_order(jane_doe(vec![LineItemRequest::new(99999, 1)]))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        OrderError::ItemNotFound { item_number } if item_number == ItemNumber::new(99999)
    ));
    assert_eq!(h.store.row_counts().await, RowCounts::default());
    assert_eq!(h.payment.call_count().await, 0);
}

#[tokio::test]
async fn test_insufficient_stock_writes_nothing_and_skips_payment() {
    let h = TestHarness::new(1).await;

    let err = h
        .orchestrator
        .create_order(jane_doe(vec![LineItemRequest::new(10001, 2)]))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InsufficientStock);
    assert_eq!(
        err.public_message(),
        "Not enough stock for item Laptop 15\" (have 1, need 2)"
    );
    assert_eq!(h.store.row_counts().await, RowCounts::default());
    assert_eq!(h.payment.call_count().await, 0);
    assert_eq!(h.laptops_available().await, Some(1));
}

#[tokio::test]
async fn test_inventory_outage_is_upstream_unavailable() {
    let h = TestHarness::new(50).await;
    h.inventory.set_fail_on_list(true).await;

    let err = h
        .orchestrator
        .create_order(jane_doe(vec![LineItemRequest::new(10001, 1)]))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::UpstreamUnavailable);
    assert_eq!(h.payment.call_count().await, 0);
}

#[tokio::test]
async fn test_payment_declined_writes_nothing() {
    let h = TestHarness::new(50).await;
    h.payment.set_fail_on_authorize(true).await;

    let err = h
        .orchestrator
        .create_order(jane_doe(vec![LineItemRequest::new(10001, 2)]))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::PaymentDeclined);
    assert_eq!(h.store.row_counts().await, RowCounts::default());
    assert_eq!(h.laptops_available().await, Some(50));
    assert_eq!(h.publisher.published_count().await, 0);
}

#[tokio::test]
async fn test_persistence_failure_rolls_back_every_row() {
    for point in [
        FailPoint::PaymentInfo,
        FailPoint::ShippingInfo,
        FailPoint::Order,
        FailPoint::LineItems,
        FailPoint::StockDecrement,
    ] {
        let h = TestHarness::new(50).await;
        h.store.fail_at(Some(point)).await;

        let err = h
            .orchestrator
            .create_order(jane_doe(vec![LineItemRequest::new(10001, 2)]))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Persistence, "fail point {point:?}");
        assert_eq!(h.store.row_counts().await, RowCounts::default());
        assert_eq!(h.laptops_available().await, Some(50));
        assert_eq!(h.publisher.published_count().await, 0);
        // The authorization already happened and cannot be undone.
        assert_eq!(h.payment.call_count().await, 1);
    }
}

#[tokio::test]
async fn test_publish_failure_still_returns_order() {
    let h = TestHarness::new(50).await;
    h.publisher.set_fail_on_publish(true).await;

    let confirmation = h
        .orchestrator
        .create_order(jane_doe(vec![LineItemRequest::new(10001, 2)]))
        .await
        .unwrap();

    assert!(
        h.store
            .order_exists(confirmation.order_id)
            .await
            .unwrap()
    );
    assert_eq!(h.publisher.published_count().await, 0);
}

#[tokio::test]
async fn test_order_created_event_is_published() {
    let h = TestHarness::new(50).await;

    let confirmation = h
        .orchestrator
        .create_order(jane_doe(vec![
            LineItemRequest::new(10001, 2),
            LineItemRequest::new(10002, 1),
        ]))
        .await
        .unwrap();

    let events = h.publisher.published().await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].source, "order-service");
    assert_eq!(events[0].event_type, ORDER_CREATED);

    let detail: OrderCreatedDetail = events[0].decode_detail().unwrap();
    assert_eq!(detail, confirmation.shipping_detail);
    assert_eq!(detail.packet_count, 2);
    assert_eq!(detail.shipment_address, "1 Main St, Springfield, IL 62701, US");
    assert_eq!(detail.payment_token, "PAY-0001");
}

#[tokio::test]
async fn test_concurrent_orders_do_not_oversell() {
    // Both orders see 50 in the snapshot; the store's guarded decrement
    // lets only one through.
    let store = InMemoryOrderStore::with_inventory(catalog(50)).await;
    let orchestrator = std::sync::Arc::new(OrderOrchestrator::new(
        StoreInventoryClient::new(store.clone()),
        StubPaymentAuthorizer::new(),
        store.clone(),
        RecordingPublisher::new(),
        SagaSettings::default(),
    ));

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let orchestrator = orchestrator.clone();
            tokio::spawn(async move {
                orchestrator
                    .create_order(jane_doe(vec![LineItemRequest::new(10001, 30)]))
                    .await
            })
        })
        .collect();

    let mut results = Vec::new();
    for handle in handles {
        results.push(handle.await.unwrap());
    }

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    let loser = results.iter().find_map(|r| r.as_ref().err()).unwrap();
    assert!(matches!(
        loser.kind(),
        ErrorKind::InsufficientStock | ErrorKind::Persistence
    ));
    assert_eq!(
        store
            .available_quantity(ItemNumber::new(10001))
            .await
            .unwrap(),
        Some(20)
    );
    assert_eq!(store.row_counts().await.orders, 1);
}

#[tokio::test]
async fn test_full_in_process_bus_does_not_hold_up_orders() {
    let store = InMemoryOrderStore::with_inventory(catalog(50)).await;
    // The stream is kept alive but never read, so the single slot stays taken.
    let (bus, _events) = event_bus::ChannelEventBus::new(1);
    let orchestrator = OrderOrchestrator::new(
        StoreInventoryClient::new(store.clone()),
        StubPaymentAuthorizer::new(),
        store.clone(),
        bus,
        SagaSettings::default(),
    );

    for _ in 0..2 {
        let placed = tokio::time::timeout(
            std::time::Duration::from_secs(2),
            orchestrator.create_order(jane_doe(vec![LineItemRequest::new(10001, 1)])),
        )
        .await
        .expect("order placement must not wait on the bus");
        assert!(placed.is_ok());
    }

    assert_eq!(store.row_counts().await.orders, 2);
    assert_eq!(
        store.available_quantity(ItemNumber::new(10001)).await.unwrap(),
        Some(48)
    );
}
