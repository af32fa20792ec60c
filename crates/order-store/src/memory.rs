use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{ItemNumber, OrderId};
use domain::{EnrichedLineItem, InventoryRecord, Money, PaymentDetails, ShippingAddress};
use tokio::sync::RwLock;

use crate::{
    LineItemRecord, NewOrder, OrderRecord, Result, StockPolicy, StoreError, store::OrderStore,
};

/// A point inside `persist_order` at which the in-memory store can be told
/// to fail, to exercise rollback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailPoint {
    PaymentInfo,
    ShippingInfo,
    Order,
    LineItems,
    StockDecrement,
}

/// Number of rows per table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowCounts {
    pub orders: usize,
    pub payment_infos: usize,
    pub shipping_infos: usize,
    pub line_items: usize,
}

#[derive(Debug, Clone)]
struct OrderRow {
    customer_name: String,
    customer_email: Option<String>,
    status: String,
    payment_info_id: i64,
    shipping_info_id: i64,
    total_amount: Money,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct PaymentRow {
    details: PaymentDetails,
    payment_token: String,
}

#[derive(Debug, Default)]
struct Tables {
    items: BTreeMap<ItemNumber, InventoryRecord>,
    payment_infos: BTreeMap<i64, PaymentRow>,
    shipping_infos: BTreeMap<i64, ShippingAddress>,
    orders: BTreeMap<OrderId, OrderRow>,
    line_items: BTreeMap<OrderId, Vec<LineItemRecord>>,
    last_payment_id: i64,
    last_shipping_id: i64,
    last_order_id: i64,
}

#[derive(Debug, Default)]
struct InMemoryState {
    tables: Tables,
    fail_at: Option<FailPoint>,
}

/// In-memory order store implementation for testing.
///
/// Every statement of an order write is checked against the tables before
/// any row is touched, so a failing write leaves them exactly as they were,
/// like a rolled-back transaction. Concurrent writers are serialized by the
/// lock.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOrderStore {
    state: Arc<RwLock<InMemoryState>>,
}

impl InMemoryOrderStore {
    /// Creates a new empty in-memory order store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store whose item table holds `records`.
    pub async fn with_inventory(records: Vec<InventoryRecord>) -> Self {
        let store = Self::new();
        {
            let mut state = store.state.write().await;
            for record in records {
                state.tables.items.insert(record.item_number, record);
            }
        }
        store
    }

    /// Makes every following `persist_order` fail at `point`; `None` clears it.
    pub async fn fail_at(&self, point: Option<FailPoint>) {
        self.state.write().await.fail_at = point;
    }

    /// Returns the number of rows in each order table.
    pub async fn row_counts(&self) -> RowCounts {
        let state = self.state.read().await;
        RowCounts {
            orders: state.tables.orders.len(),
            payment_infos: state.tables.payment_infos.len(),
            shipping_infos: state.tables.shipping_infos.len(),
            line_items: state.tables.line_items.values().map(Vec::len).sum(),
        }
    }
}

fn check(fail_at: Option<FailPoint>, point: FailPoint) -> Result<()> {
    if fail_at == Some(point) {
        return Err(StoreError::Unavailable(format!(
            "injected failure at {point:?}"
        )));
    }
    Ok(())
}

/// Works out the stock left for every item the order touches, keyed and
/// therefore applied in item-number order.
fn remaining_stock(
    items: &BTreeMap<ItemNumber, InventoryRecord>,
    lines: &[EnrichedLineItem],
) -> Result<BTreeMap<ItemNumber, u32>> {
    let mut remaining = BTreeMap::new();
    for line in lines {
        let available = match remaining.get(&line.item_number) {
            Some(left) => *left,
            None => {
                items
                    .get(&line.item_number)
                    .ok_or(StoreError::UnknownItem(line.item_number))?
                    .available_quantity
            }
        };
        if available < line.quantity {
            return Err(StoreError::StockExhausted {
                item_number: line.item_number,
                requested: line.quantity,
                available,
            });
        }
        remaining.insert(line.item_number, available - line.quantity);
    }
    Ok(remaining)
}

fn write_order(tables: &mut Tables, order: NewOrder, fail_at: Option<FailPoint>) -> Result<OrderId> {
    check(fail_at, FailPoint::PaymentInfo)?;
    check(fail_at, FailPoint::ShippingInfo)?;
    check(fail_at, FailPoint::Order)?;
    check(fail_at, FailPoint::LineItems)?;
    let remaining = match order.stock_policy {
        StockPolicy::Decrement => {
            check(fail_at, FailPoint::StockDecrement)?;
            remaining_stock(&tables.items, &order.lines)?
        }
        StockPolicy::Skip => BTreeMap::new(),
    };

    // Nothing below can fail.
    tables.last_payment_id += 1;
    let payment_info_id = tables.last_payment_id;
    tables.payment_infos.insert(
        payment_info_id,
        PaymentRow {
            details: order.payment,
            payment_token: order.payment_token,
        },
    );

    tables.last_shipping_id += 1;
    let shipping_info_id = tables.last_shipping_id;
    tables
        .shipping_infos
        .insert(shipping_info_id, order.shipping);

    tables.last_order_id += 1;
    let order_id = OrderId::new(tables.last_order_id);
    tables.orders.insert(
        order_id,
        OrderRow {
            customer_name: order.customer_name,
            customer_email: order.customer_email,
            status: order.status,
            payment_info_id,
            shipping_info_id,
            total_amount: order.total_amount,
            created_at: Utc::now(),
        },
    );
    tables.line_items.insert(
        order_id,
        order.lines.iter().map(LineItemRecord::from).collect(),
    );

    for (item_number, left) in remaining {
        if let Some(item) = tables.items.get_mut(&item_number) {
            item.available_quantity = left;
        }
    }

    Ok(order_id)
}

fn read_order(tables: &Tables, id: OrderId) -> Result<Option<OrderRecord>> {
    let Some(row) = tables.orders.get(&id) else {
        return Ok(None);
    };
    let payment = tables
        .payment_infos
        .get(&row.payment_info_id)
        .ok_or_else(|| StoreError::CorruptRow(format!("order {id} has no payment info")))?;
    let shipping = tables
        .shipping_infos
        .get(&row.shipping_info_id)
        .ok_or_else(|| StoreError::CorruptRow(format!("order {id} has no shipping info")))?;
    let line_items = tables.line_items.get(&id).cloned().unwrap_or_default();

    Ok(Some(OrderRecord {
        id,
        customer_name: row.customer_name.clone(),
        customer_email: row.customer_email.clone(),
        status: row.status.clone(),
        payment_token: payment.payment_token.clone(),
        total_amount: row.total_amount,
        payment: payment.details.clone(),
        shipping: shipping.clone(),
        line_items,
        created_at: row.created_at,
    }))
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn persist_order(&self, order: NewOrder) -> Result<OrderId> {
        let mut state = self.state.write().await;
        let fail_at = state.fail_at;
        write_order(&mut state.tables, order, fail_at)
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<OrderRecord>> {
        let state = self.state.read().await;
        read_order(&state.tables, id)
    }

    async fn list_orders_after(
        &self,
        after: Option<OrderId>,
        limit: usize,
    ) -> Result<Vec<OrderRecord>> {
        let state = self.state.read().await;
        let start = after.map_or(i64::MIN, |id| id.as_i64().saturating_add(1));
        state
            .tables
            .orders
            .range(OrderId::new(start)..)
            .take(limit)
            .filter_map(|(id, _)| read_order(&state.tables, *id).transpose())
            .collect()
    }

    async fn list_inventory(&self) -> Result<Vec<InventoryRecord>> {
        let state = self.state.read().await;
        Ok(state.tables.items.values().cloned().collect())
    }

    async fn upsert_inventory(&self, records: Vec<InventoryRecord>) -> Result<()> {
        let mut state = self.state.write().await;
        for record in records {
            state.tables.items.insert(record.item_number, record);
        }
        Ok(())
    }
}
