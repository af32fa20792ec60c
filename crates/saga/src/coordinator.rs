//! Order orchestrator driving the placement saga.

use common::OrderId;
use domain::{
    EnrichedLineItem, InventoryRecord, Money, ORDER_CREATED, ORDER_SERVICE_SOURCE,
    OrderCreatedDetail, OrderRequest, ValidOrder, enrich, order_total,
};
use event_bus::{BusEvent, EventPublisher};
use order_store::{NewOrder, OrderRecord, OrderStore, StockPolicy};
use serde::{Deserialize, Serialize};

use crate::error::{OrderError, Result};
use crate::instance::PlacementSaga;
use crate::services::inventory::InventoryClient;
use crate::services::payment::{PaymentAuthorizer, PaymentToken};

/// Per-deployment knobs of the placement saga.
#[derive(Debug, Clone)]
pub struct SagaSettings {
    /// Storefront registration id carried by every `OrderCreated` event.
    pub business_id: String,
    /// Whether the order transaction decrements the local item table.
    pub stock_policy: StockPolicy,
    /// Status stored when the request does not carry one.
    pub default_status: String,
}

impl Default for SagaSettings {
    fn default() -> Self {
        Self {
            business_id: "demo-store".to_string(),
            stock_policy: StockPolicy::Decrement,
            default_status: "Accepted".to_string(),
        }
    }
}

/// What the caller gets back for a placed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderConfirmation {
    pub order_id: OrderId,
    #[serde(with = "domain::money::decimal")]
    pub total_amount: Money,
    pub payment_token: PaymentToken,
    pub shipping_detail: OrderCreatedDetail,
}

/// Orchestrates order placement.
///
/// Each call to [`create_order`](Self::create_order) runs the steps
/// validate → enrich → authorize → persist → publish strictly in sequence.
/// Steps up to and including persistence fail closed; publication is
/// best-effort and never fails a committed order.
pub struct OrderOrchestrator<I, P, S, E>
where
    I: InventoryClient,
    P: PaymentAuthorizer,
    S: OrderStore,
    E: EventPublisher,
{
    inventory: I,
    payment: P,
    store: S,
    publisher: E,
    settings: SagaSettings,
}

/// Advances on success, fails the saga on error.
fn settle<T, E>(saga: &mut PlacementSaga, result: std::result::Result<T, E>) -> Result<T>
where
    E: Into<OrderError>,
{
    match result {
        Ok(value) => {
            saga.advance();
            Ok(value)
        }
        Err(err) => {
            saga.fail();
            Err(err.into())
        }
    }
}

impl<I, P, S, E> OrderOrchestrator<I, P, S, E>
where
    I: InventoryClient,
    P: PaymentAuthorizer,
    S: OrderStore,
    E: EventPublisher,
{
    /// Creates a new orchestrator.
    pub fn new(inventory: I, payment: P, store: S, publisher: E, settings: SagaSettings) -> Self {
        Self {
            inventory,
            payment,
            store,
            publisher,
            settings,
        }
    }

    /// Places an order.
    #[tracing::instrument(skip(self, request), fields(business_id = %self.settings.business_id))]
    pub async fn create_order(&self, request: OrderRequest) -> Result<OrderConfirmation> {
        metrics::counter!("orders_submitted_total").increment(1);
        let mut saga = PlacementSaga::new();

        let result = self.run(&mut saga, request).await;

        metrics::histogram!("order_saga_duration_seconds").record(saga.elapsed().as_secs_f64());
        match &result {
            Ok(confirmation) => {
                metrics::counter!("orders_placed_total").increment(1);
                tracing::info!(
                    order_id = %confirmation.order_id,
                    total = %confirmation.total_amount,
                    published = saga.published(),
                    "order placed"
                );
            }
            Err(err) => {
                metrics::counter!("orders_failed_total", "kind" => err.kind().as_str())
                    .increment(1);
                tracing::warn!(
                    kind = %err.kind(),
                    failed_at = ?saga.failed_at(),
                    error = %err,
                    "order placement failed"
                );
            }
        }
        result
    }

    async fn run(&self, saga: &mut PlacementSaga, request: OrderRequest) -> Result<OrderConfirmation> {
        let order = settle(saga, request.validate())?;

        let lines = settle(saga, self.enrich(&order).await)?;
        let total_amount = order_total(&lines);

        let payment_token = settle(
            saga,
            self.payment.authorize(total_amount, &order.payment).await,
        )?;

        let shipment_lines: Vec<_> = lines
            .iter()
            .map(|line| (line.item_number, line.quantity))
            .collect();
        let new_order = NewOrder {
            customer_name: order.customer_name,
            customer_email: order.customer_email,
            status: order
                .status
                .unwrap_or_else(|| self.settings.default_status.clone()),
            payment: order.payment,
            payment_token: payment_token.as_str().to_string(),
            shipping: order.shipping.clone(),
            lines,
            total_amount,
            stock_policy: self.settings.stock_policy,
        };

        let order_id = match self.store.persist_order(new_order).await {
            Ok(order_id) => {
                saga.advance();
                order_id
            }
            Err(err) => {
                saga.fail();
                // The authorization cannot be undone from here.
                tracing::error!(
                    payment_token = %payment_token,
                    error = %err,
                    "order not persisted after payment was authorized"
                );
                return Err(err.into());
            }
        };

        let shipping_detail = OrderCreatedDetail::new(
            order_id,
            self.settings.business_id.clone(),
            &order.shipping,
            payment_token.as_str(),
            shipment_lines,
        );
        if self.publish(&shipping_detail).await {
            saga.mark_published();
        }
        saga.advance();

        Ok(OrderConfirmation {
            order_id,
            total_amount,
            payment_token,
            shipping_detail,
        })
    }

    async fn enrich(&self, order: &ValidOrder) -> Result<Vec<EnrichedLineItem>> {
        let snapshot = self.inventory.list_inventory().await?;
        Ok(enrich(&order.lines, &snapshot)?)
    }

    /// Hands `OrderCreated` to the bus. Failures are logged and swallowed.
    async fn publish(&self, detail: &OrderCreatedDetail) -> bool {
        let result = match BusEvent::new(ORDER_SERVICE_SOURCE, ORDER_CREATED, detail) {
            Ok(event) => self.publisher.publish(&event).await,
            Err(err) => Err(err),
        };

        match result {
            Ok(()) => {
                metrics::counter!("order_events_published_total").increment(1);
                true
            }
            Err(err) => {
                metrics::counter!("order_event_publish_failures_total").increment(1);
                tracing::error!(
                    order_id = %detail.order_id,
                    error = %err,
                    "failed to publish OrderCreated event"
                );
                false
            }
        }
    }

    /// Loads a placed order.
    pub async fn get_order(&self, order_id: OrderId) -> Result<Option<OrderRecord>> {
        Ok(self.store.get_order(order_id).await?)
    }

    /// Returns the current inventory snapshot.
    pub async fn inventory(&self) -> Result<Vec<InventoryRecord>> {
        self.inventory.list_inventory().await
    }
}
