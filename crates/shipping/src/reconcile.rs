//! Recovery of `OrderCreated` events lost between commit and publish.

use std::time::Duration;

use common::OrderId;
use domain::{ORDER_CREATED, ORDER_SERVICE_SOURCE, OrderCreatedDetail};
use event_bus::{BusEvent, EventPublisher};
use order_store::{OrderRecord, OrderStore};

use crate::{Result, store::ShipmentStore};

const DEFAULT_PAGE_SIZE: usize = 100;

/// Counts from one reconciliation sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Placed orders examined.
    pub scanned: usize,
    /// Orders without a shipment whose event was published again.
    pub republished: usize,
    /// Orders without a shipment whose republish failed.
    pub failed: usize,
}

/// Re-publishes `OrderCreated` for placed orders that have no shipment
/// record.
///
/// Safe to run at any time: the consumer upserts, so an order whose original
/// event is merely delayed ends up with one record either way.
pub struct ShipmentReconciler<O, S, P> {
    orders: O,
    shipments: S,
    publisher: P,
    business_id: String,
    page_size: usize,
}

impl<O, S, P> ShipmentReconciler<O, S, P>
where
    O: OrderStore,
    S: ShipmentStore,
    P: EventPublisher,
{
    /// Creates a reconciler.
    pub fn new(orders: O, shipments: S, publisher: P, business_id: impl Into<String>) -> Self {
        Self {
            orders,
            shipments,
            publisher,
            business_id: business_id.into(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Sets how many orders are read per page.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Walks every placed order once.
    #[tracing::instrument(skip(self))]
    pub async fn sweep(&self) -> Result<ReconcileReport> {
        let mut report = ReconcileReport::default();
        let mut after: Option<OrderId> = None;

        loop {
            let page = self.orders.list_orders_after(after, self.page_size).await?;
            let Some(last) = page.last() else {
                break;
            };
            after = Some(last.id);

            for order in &page {
                report.scanned += 1;
                if self.shipments.get(order.id).await?.is_some() {
                    continue;
                }
                if self.republish(order).await {
                    report.republished += 1;
                } else {
                    report.failed += 1;
                }
            }

            if page.len() < self.page_size {
                break;
            }
        }

        if report.republished > 0 || report.failed > 0 {
            tracing::info!(
                scanned = report.scanned,
                republished = report.republished,
                failed = report.failed,
                "reconciliation sweep finished"
            );
        }
        Ok(report)
    }

    async fn republish(&self, order: &OrderRecord) -> bool {
        let detail = OrderCreatedDetail::new(
            order.id,
            self.business_id.clone(),
            &order.shipping,
            order.payment_token.clone(),
            order.shipment_lines(),
        );
        let result = match BusEvent::new(ORDER_SERVICE_SOURCE, ORDER_CREATED, &detail) {
            Ok(event) => self.publisher.publish(&event).await,
            Err(err) => Err(err),
        };

        match result {
            Ok(()) => {
                metrics::counter!("reconcile_republished_total").increment(1);
                tracing::info!(order_id = %order.id, "republished OrderCreated");
                true
            }
            Err(err) => {
                tracing::error!(order_id = %order.id, error = %err, "republish failed");
                false
            }
        }
    }

    /// Sweeps every `every`, forever. Sweep errors are logged and the loop
    /// continues.
    pub async fn run_periodically(&self, every: Duration) {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            if let Err(err) = self.sweep().await {
                tracing::error!(error = %err, "reconciliation sweep failed");
            }
        }
    }
}
