//! Rows written and read by the order store.

use chrono::{DateTime, Utc};
use common::{ItemNumber, OrderId};
use domain::{EnrichedLineItem, Money, PaymentDetails, ShippingAddress};

/// Whether placing an order decrements the local item table.
///
/// `Decrement` treats the local table as the source of truth for
/// availability; `Skip` is used when inventory lives in a separate service
/// and the local table is only a shadow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StockPolicy {
    #[default]
    Decrement,
    Skip,
}

/// Everything needed to write one order in a single transaction.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub customer_name: String,
    pub customer_email: Option<String>,
    pub status: String,
    pub payment: PaymentDetails,
    pub payment_token: String,
    pub shipping: ShippingAddress,
    pub lines: Vec<EnrichedLineItem>,
    pub total_amount: Money,
    pub stock_policy: StockPolicy,
}

/// Snapshot of an ordered line, frozen at order time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItemRecord {
    pub item_number: ItemNumber,
    pub item_name: String,
    pub quantity: u32,
    pub unit_price: Money,
}

impl From<&EnrichedLineItem> for LineItemRecord {
    fn from(line: &EnrichedLineItem) -> Self {
        Self {
            item_number: line.item_number,
            item_name: line.item_name.clone(),
            quantity: line.quantity,
            unit_price: line.unit_price,
        }
    }
}

/// A placed order with its payment, shipping and line item snapshots.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRecord {
    pub id: OrderId,
    pub customer_name: String,
    pub customer_email: Option<String>,
    pub status: String,
    pub payment_token: String,
    pub total_amount: Money,
    pub payment: PaymentDetails,
    pub shipping: ShippingAddress,
    pub line_items: Vec<LineItemRecord>,
    pub created_at: DateTime<Utc>,
}

impl OrderRecord {
    /// `(item number, quantity)` per line, in line order.
    pub fn shipment_lines(&self) -> impl Iterator<Item = (ItemNumber, u32)> + '_ {
        self.line_items
            .iter()
            .map(|line| (line.item_number, line.quantity))
    }
}
