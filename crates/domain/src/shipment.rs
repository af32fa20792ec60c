//! Shipment manifest carried by the `OrderCreated` event.

use common::{ItemNumber, OrderId};
use serde::{Deserialize, Serialize};

use crate::request::ShippingAddress;

/// Event type emitted once an order is committed.
pub const ORDER_CREATED: &str = "OrderCreated";

/// Event source of the order service.
pub const ORDER_SERVICE_SOURCE: &str = "order-service";

/// Shipping weight of one unit of any item.
pub const UNIT_WEIGHT: f64 = 1.0;

/// One packet per order line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Packet {
    pub item_number: ItemNumber,
    pub packet_weight: f64,
}

impl Packet {
    /// Builds the packet for a line of `quantity` units.
    pub fn for_line(item_number: ItemNumber, quantity: u32) -> Self {
        Self {
            item_number,
            packet_weight: f64::from(quantity) * UNIT_WEIGHT,
        }
    }
}

/// Payload of the `OrderCreated` event, also returned to the caller as the
/// order's shipping detail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreatedDetail {
    pub order_id: OrderId,
    pub business_id: String,
    pub shipment_address: String,
    pub packet_count: u32,
    pub packets: Vec<Packet>,
    pub payment_token: String,
}

impl OrderCreatedDetail {
    /// Derives the detail for an order from its lines.
    pub fn new(
        order_id: OrderId,
        business_id: impl Into<String>,
        address: &ShippingAddress,
        payment_token: impl Into<String>,
        lines: impl IntoIterator<Item = (ItemNumber, u32)>,
    ) -> Self {
        let packets: Vec<Packet> = lines
            .into_iter()
            .map(|(item_number, quantity)| Packet::for_line(item_number, quantity))
            .collect();
        Self {
            order_id,
            business_id: business_id.into(),
            shipment_address: address.single_line(),
            packet_count: saturating_count(packets.len()),
            packets,
            payment_token: payment_token.into(),
        }
    }

    /// Sum of all packet weights.
    pub fn total_weight(&self) -> f64 {
        self.packets.iter().map(|p| p.packet_weight).sum()
    }

    /// Average packet weight; zero for an empty manifest.
    pub fn weight_per_packet(&self) -> f64 {
        if self.packet_count == 0 {
            0.0
        } else {
            self.total_weight() / f64::from(self.packet_count)
        }
    }
}

fn saturating_count(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}
