//! `OrderCreated` consumer.

use std::time::Duration;

use common::OrderId;
use domain::{ORDER_CREATED, ORDER_SERVICE_SOURCE, OrderCreatedDetail};
use event_bus::{BusEvent, EventStream};
use futures_util::StreamExt;

use crate::{Result, ShipmentRecord, ShippingError, store::ShipmentStore};

/// Result of handling one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleOutcome {
    /// A shipment record was written for the order.
    Recorded(OrderId),
    /// The event is not an order-service `OrderCreated` event.
    Ignored,
}

/// How often the in-process transport redelivers an event that failed.
#[derive(Debug, Clone, Copy)]
pub struct RedeliveryPolicy {
    /// Total deliveries per event, the first one included.
    pub max_attempts: u32,
    /// Pause between deliveries.
    pub backoff: Duration,
}

impl Default for RedeliveryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_millis(200),
        }
    }
}

/// Records a shipment for every `OrderCreated` event it receives.
#[derive(Debug, Clone)]
pub struct ShippingConsumer<S> {
    store: S,
    policy: RedeliveryPolicy,
}

impl<S: ShipmentStore> ShippingConsumer<S> {
    /// Creates a consumer with the default redelivery policy.
    pub fn new(store: S) -> Self {
        Self::with_policy(store, RedeliveryPolicy::default())
    }

    /// Creates a consumer with a custom redelivery policy.
    pub fn with_policy(store: S, policy: RedeliveryPolicy) -> Self {
        Self { store, policy }
    }

    /// Returns the shipment store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Handles one delivery.
    ///
    /// Idempotent: delivering the same event again overwrites the same
    /// record.
    #[tracing::instrument(skip(self, event), fields(event_id = %event.id, event_type = %event.event_type))]
    pub async fn handle(&self, event: &BusEvent) -> Result<HandleOutcome> {
        if !event.is(ORDER_SERVICE_SOURCE, ORDER_CREATED) {
            tracing::debug!(source = %event.source, "ignoring event");
            return Ok(HandleOutcome::Ignored);
        }

        let detail: OrderCreatedDetail = event.decode_detail().map_err(ShippingError::Decode)?;
        let record = ShipmentRecord::from_detail(&detail, event.time);
        let order_id = record.order_id;

        self.store.upsert(record).await?;

        metrics::counter!("shipments_recorded_total").increment(1);
        tracing::info!(
            %order_id,
            packet_count = detail.packet_count,
            "shipment recorded"
        );
        Ok(HandleOutcome::Recorded(order_id))
    }

    /// Consumes `events` until the stream ends.
    pub async fn run(&self, mut events: EventStream) {
        tracing::info!("shipping consumer started");
        while let Some(event) = events.next().await {
            self.deliver(&event).await;
        }
        tracing::info!("event stream closed, shipping consumer stopped");
    }

    /// Handles one event, redelivering it per the policy on retryable
    /// failures.
    async fn deliver(&self, event: &BusEvent) {
        let max_attempts = self.policy.max_attempts.max(1);
        for attempt in 1..=max_attempts {
            match self.handle(event).await {
                Ok(_) => return,
                Err(err) if err.is_retryable() && attempt < max_attempts => {
                    tracing::warn!(
                        event_id = %event.id,
                        attempt,
                        error = %err,
                        "shipment handling failed, redelivering"
                    );
                    tokio::time::sleep(self.policy.backoff).await;
                }
                Err(err) => {
                    metrics::counter!("shipment_handle_failures_total").increment(1);
                    tracing::error!(
                        event_id = %event.id,
                        attempt,
                        error = %err,
                        "giving up on event"
                    );
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use domain::{ItemNumber, ShippingAddress};
    use event_bus::{ChannelEventBus, EventPublisher};

    use super::*;
    use crate::InMemoryShipmentStore;

    fn order_created(order_id: i64) -> BusEvent {
        let address = ShippingAddress {
            address1: "1 Main St".to_string(),
            address2: None,
            city: "Springfield".to_string(),
            state: "IL".to_string(),
            country: "US".to_string(),
            postal_code: "62701".to_string(),
            email: None,
        };
        let detail = OrderCreatedDetail::new(
            OrderId::new(order_id),
            "demo-store",
            &address,
            "PAY-0001",
            [(ItemNumber::new(10001), 2)],
        );
        BusEvent::new(ORDER_SERVICE_SOURCE, ORDER_CREATED, &detail).unwrap()
    }

    fn fast_policy() -> RedeliveryPolicy {
        RedeliveryPolicy {
            max_attempts: 3,
            backoff: Duration::from_millis(1),
        }
    }

    #[tokio::test]
    async fn test_redelivery_leaves_one_record() {
        let consumer = ShippingConsumer::new(InMemoryShipmentStore::new());
        let event = order_created(7);

        assert_eq!(
            consumer.handle(&event).await.unwrap(),
            HandleOutcome::Recorded(OrderId::new(7))
        );
        consumer.handle(&event).await.unwrap();

        assert_eq!(consumer.store().count().await.unwrap(), 1);
        let record = consumer.store().get(OrderId::new(7)).await.unwrap().unwrap();
        assert_eq!(record.packet_count, 1);
        assert_eq!(record.weight_per_packet, 2.0);
        assert_eq!(record.created_at, event.time);
    }

    #[tokio::test]
    async fn test_other_events_are_ignored() {
        let consumer = ShippingConsumer::new(InMemoryShipmentStore::new());
        let event = BusEvent::new("billing", "InvoiceSent", &serde_json::json!({})).unwrap();

        assert_eq!(consumer.handle(&event).await.unwrap(), HandleOutcome::Ignored);
        assert_eq!(consumer.store().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_bad_detail_is_not_retryable() {
        let consumer = ShippingConsumer::new(InMemoryShipmentStore::new());
        let event = BusEvent::new(
            ORDER_SERVICE_SOURCE,
            ORDER_CREATED,
            &serde_json::json!({"orderId": "not-a-number"}),
        )
        .unwrap();

        let err = consumer.handle(&event).await.unwrap_err();
        assert!(matches!(err, ShippingError::Decode(_)));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_run_consumes_channel_until_closed() {
        let store = InMemoryShipmentStore::new();
        let consumer = ShippingConsumer::with_policy(store.clone(), fast_policy());
        let (bus, events) = ChannelEventBus::new(8);

        bus.publish(&order_created(1)).await.unwrap();
        bus.publish(&order_created(1)).await.unwrap();
        bus.publish(&order_created(2)).await.unwrap();
        drop(bus);

        consumer.run(events).await;

        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_run_gives_up_after_max_attempts() {
        let store = InMemoryShipmentStore::new();
        store.set_fail_on_upsert(true).await;
        let consumer = ShippingConsumer::with_policy(store.clone(), fast_policy());
        let (bus, events) = ChannelEventBus::new(8);

        bus.publish(&order_created(1)).await.unwrap();
        drop(bus);
        consumer.run(events).await;

        assert_eq!(store.count().await.unwrap(), 0);
    }
}
