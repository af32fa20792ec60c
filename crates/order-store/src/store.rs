use std::sync::Arc;

use async_trait::async_trait;
use common::{ItemNumber, OrderId};
use domain::InventoryRecord;

use crate::{NewOrder, OrderRecord, Result};

/// Core trait for order store implementations.
///
/// All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Writes an order atomically.
    ///
    /// Inserts the payment snapshot, the shipping snapshot, the order row and
    /// every line item, then applies the stock decrement when the order's
    /// [`StockPolicy`](crate::StockPolicy) asks for it. Either everything is
    /// committed or nothing is.
    ///
    /// Returns the id assigned to the new order.
    async fn persist_order(&self, order: NewOrder) -> Result<OrderId>;

    /// Loads a placed order by id.
    async fn get_order(&self, id: OrderId) -> Result<Option<OrderRecord>>;

    /// Lists orders with an id greater than `after`, in ascending id order.
    async fn list_orders_after(
        &self,
        after: Option<OrderId>,
        limit: usize,
    ) -> Result<Vec<OrderRecord>>;

    /// Returns the local item table.
    async fn list_inventory(&self) -> Result<Vec<InventoryRecord>>;

    /// Inserts or replaces items in the local item table.
    async fn upsert_inventory(&self, records: Vec<InventoryRecord>) -> Result<()>;
}

#[async_trait]
impl<T: OrderStore + ?Sized> OrderStore for Arc<T> {
    async fn persist_order(&self, order: NewOrder) -> Result<OrderId> {
        (**self).persist_order(order).await
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<OrderRecord>> {
        (**self).get_order(id).await
    }

    async fn list_orders_after(
        &self,
        after: Option<OrderId>,
        limit: usize,
    ) -> Result<Vec<OrderRecord>> {
        (**self).list_orders_after(after, limit).await
    }

    async fn list_inventory(&self) -> Result<Vec<InventoryRecord>> {
        (**self).list_inventory().await
    }

    async fn upsert_inventory(&self, records: Vec<InventoryRecord>) -> Result<()> {
        (**self).upsert_inventory(records).await
    }
}

/// Extension trait providing convenience methods for order stores.
#[async_trait]
pub trait OrderStoreExt: OrderStore {
    /// Current availability of one item, if the item exists.
    async fn available_quantity(&self, item_number: ItemNumber) -> Result<Option<u32>> {
        Ok(self
            .list_inventory()
            .await?
            .into_iter()
            .find(|record| record.item_number == item_number)
            .map(|record| record.available_quantity))
    }

    /// Checks if an order exists.
    async fn order_exists(&self, id: OrderId) -> Result<bool> {
        Ok(self.get_order(id).await?.is_some())
    }
}

// Blanket implementation for all OrderStore implementations
impl<T: OrderStore + ?Sized> OrderStoreExt for T {}
