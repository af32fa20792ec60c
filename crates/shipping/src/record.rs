use chrono::{DateTime, Utc};
use common::OrderId;
use domain::OrderCreatedDetail;
use serde::{Deserialize, Serialize};

/// What shipping keeps per order. One record per order id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentRecord {
    pub order_id: OrderId,
    pub business_id: String,
    pub shipment_address: String,
    pub payment_token: String,
    pub packet_count: u32,
    pub weight_per_packet: f64,
    pub created_at: DateTime<Utc>,
}

impl ShipmentRecord {
    /// Derives the record for an `OrderCreated` detail.
    pub fn from_detail(detail: &OrderCreatedDetail, created_at: DateTime<Utc>) -> Self {
        Self {
            order_id: detail.order_id,
            business_id: detail.business_id.clone(),
            shipment_address: detail.shipment_address.clone(),
            payment_token: detail.payment_token.clone(),
            packet_count: detail.packet_count,
            weight_per_packet: detail.weight_per_packet(),
            created_at,
        }
    }
}
