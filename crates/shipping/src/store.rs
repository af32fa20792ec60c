use std::sync::Arc;

use async_trait::async_trait;
use common::OrderId;

use crate::{Result, ShipmentRecord};

/// Core trait for shipment store implementations.
#[async_trait]
pub trait ShipmentStore: Send + Sync {
    /// Inserts the record, or overwrites the one with the same order id.
    async fn upsert(&self, record: ShipmentRecord) -> Result<()>;

    /// Loads the record for an order.
    async fn get(&self, order_id: OrderId) -> Result<Option<ShipmentRecord>>;

    /// Returns the number of records.
    async fn count(&self) -> Result<usize>;
}

#[async_trait]
impl<T: ShipmentStore + ?Sized> ShipmentStore for Arc<T> {
    async fn upsert(&self, record: ShipmentRecord) -> Result<()> {
        (**self).upsert(record).await
    }

    async fn get(&self, order_id: OrderId) -> Result<Option<ShipmentRecord>> {
        (**self).get(order_id).await
    }

    async fn count(&self) -> Result<usize> {
        (**self).count().await
    }
}
