use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::OrderId;
use tokio::sync::RwLock;

use crate::{Result, ShipmentRecord, ShippingError, store::ShipmentStore};

#[derive(Debug, Default)]
struct InMemoryShipmentState {
    records: BTreeMap<OrderId, ShipmentRecord>,
    fail_on_upsert: bool,
}

/// In-memory shipment store keyed by order id.
#[derive(Debug, Clone, Default)]
pub struct InMemoryShipmentStore {
    state: Arc<RwLock<InMemoryShipmentState>>,
}

impl InMemoryShipmentStore {
    /// Creates a new empty in-memory shipment store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the store to fail every following upsert.
    pub async fn set_fail_on_upsert(&self, fail: bool) {
        self.state.write().await.fail_on_upsert = fail;
    }
}

#[async_trait]
impl ShipmentStore for InMemoryShipmentStore {
    async fn upsert(&self, record: ShipmentRecord) -> Result<()> {
        let mut state = self.state.write().await;
        if state.fail_on_upsert {
            return Err(ShippingError::Unavailable("upsert rejected".to_string()));
        }
        state.records.insert(record.order_id, record);
        Ok(())
    }

    async fn get(&self, order_id: OrderId) -> Result<Option<ShipmentRecord>> {
        Ok(self.state.read().await.records.get(&order_id).cloned())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.state.read().await.records.len())
    }
}
