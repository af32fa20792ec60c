use std::collections::HashMap;

use async_trait::async_trait;
use common::{ItemNumber, OrderId};
use domain::{InventoryRecord, Money, PaymentDetails, ShippingAddress};
use sqlx::{PgPool, Postgres, Row, Transaction, postgres::PgRow};

use crate::{
    LineItemRecord, NewOrder, OrderRecord, Result, StockPolicy, StoreError, store::OrderStore,
};

const ORDER_SELECT: &str = r#"
    SELECT o.id, o.customer_name, o.customer_email, o.status,
           o.total_cents, o.created_at,
           p.holder_name, p.card_number, p.expiry, p.cvv, p.payment_token,
           s.address1, s.address2, s.city, s.state, s.country, s.postal_code, s.email
    FROM customer_order o
    JOIN payment_info p ON p.id = o.payment_info_id
    JOIN shipping_info s ON s.id = o.shipping_info_id
"#;

/// PostgreSQL-backed order store implementation.
#[derive(Clone)]
pub struct PostgresOrderStore {
    pool: PgPool,
}

impl PostgresOrderStore {
    /// Creates a new PostgreSQL order store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the order database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations/orders")
            .run(&self.pool)
            .await?;
        Ok(())
    }

    /// Applies the guarded decrement for one line.
    ///
    /// The `UPDATE` only matches while enough units remain, so a concurrent
    /// writer that already took the stock leaves zero affected rows.
    async fn decrement_stock(
        tx: &mut Transaction<'_, Postgres>,
        item_number: ItemNumber,
        quantity: u32,
    ) -> Result<()> {
        let affected = sqlx::query(
            r#"
            UPDATE inventory_item
            SET available_quantity = available_quantity - $1
            WHERE item_number = $2 AND available_quantity >= $1
            "#,
        )
        .bind(i64::from(quantity))
        .bind(item_number.as_i64())
        .execute(&mut **tx)
        .await?
        .rows_affected();

        if affected == 1 {
            return Ok(());
        }

        let available: Option<i64> = sqlx::query_scalar(
            "SELECT available_quantity FROM inventory_item WHERE item_number = $1",
        )
        .bind(item_number.as_i64())
        .fetch_optional(&mut **tx)
        .await?;

        match available {
            None => Err(StoreError::UnknownItem(item_number)),
            Some(available) => Err(StoreError::StockExhausted {
                item_number,
                requested: quantity,
                available: to_u32(available, "available_quantity")?,
            }),
        }
    }

    fn row_to_order(row: &PgRow) -> Result<OrderRecord> {
        Ok(OrderRecord {
            id: OrderId::new(row.try_get("id")?),
            customer_name: row.try_get("customer_name")?,
            customer_email: row.try_get("customer_email")?,
            status: row.try_get("status")?,
            payment_token: row.try_get("payment_token")?,
            total_amount: Money::from_cents(row.try_get("total_cents")?),
            payment: PaymentDetails {
                holder_name: row.try_get("holder_name")?,
                card_number: row.try_get("card_number")?,
                expiry: row.try_get("expiry")?,
                cvv: row.try_get("cvv")?,
            },
            shipping: ShippingAddress {
                address1: row.try_get("address1")?,
                address2: row.try_get("address2")?,
                city: row.try_get("city")?,
                state: row.try_get("state")?,
                country: row.try_get("country")?,
                postal_code: row.try_get("postal_code")?,
                email: row.try_get("email")?,
            },
            line_items: Vec::new(),
            created_at: row.try_get("created_at")?,
        })
    }

    fn row_to_inventory(row: &PgRow) -> Result<InventoryRecord> {
        Ok(InventoryRecord {
            item_number: ItemNumber::new(row.try_get("item_number")?),
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            unit_price: Money::from_cents(row.try_get("unit_price_cents")?),
            available_quantity: to_u32(row.try_get("available_quantity")?, "available_quantity")?,
        })
    }

    /// Loads line items for `orders` and attaches them in insertion order.
    async fn attach_line_items(&self, orders: &mut [OrderRecord]) -> Result<()> {
        if orders.is_empty() {
            return Ok(());
        }
        let ids: Vec<i64> = orders.iter().map(|o| o.id.as_i64()).collect();

        let rows = sqlx::query(
            r#"
            SELECT order_id, item_number, item_name, quantity, unit_price_cents
            FROM customer_order_line_item
            WHERE order_id = ANY($1)
            ORDER BY id ASC
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_order: HashMap<i64, Vec<LineItemRecord>> = HashMap::new();
        for row in rows {
            let order_id: i64 = row.try_get("order_id")?;
            by_order.entry(order_id).or_default().push(LineItemRecord {
                item_number: ItemNumber::new(row.try_get("item_number")?),
                item_name: row.try_get("item_name")?,
                quantity: to_u32(row.try_get("quantity")?, "quantity")?,
                unit_price: Money::from_cents(row.try_get("unit_price_cents")?),
            });
        }

        for order in orders {
            order.line_items = by_order.remove(&order.id.as_i64()).unwrap_or_default();
        }
        Ok(())
    }
}

fn to_u32(value: i64, column: &str) -> Result<u32> {
    u32::try_from(value)
        .map_err(|_| StoreError::CorruptRow(format!("{column} out of range: {value}")))
}

#[async_trait]
impl OrderStore for PostgresOrderStore {
    #[tracing::instrument(skip(self, order), fields(lines = order.lines.len()))]
    async fn persist_order(&self, order: NewOrder) -> Result<OrderId> {
        // Dropping `tx` on any early return rolls the whole write back.
        let mut tx = self.pool.begin().await?;

        let payment_info_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO payment_info (holder_name, card_number, expiry, cvv, payment_token)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(&order.payment.holder_name)
        .bind(&order.payment.card_number)
        .bind(&order.payment.expiry)
        .bind(&order.payment.cvv)
        .bind(&order.payment_token)
        .fetch_one(&mut *tx)
        .await?;

        let shipping_info_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO shipping_info (address1, address2, city, state, country, postal_code, email)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(&order.shipping.address1)
        .bind(&order.shipping.address2)
        .bind(&order.shipping.city)
        .bind(&order.shipping.state)
        .bind(&order.shipping.country)
        .bind(&order.shipping.postal_code)
        .bind(&order.shipping.email)
        .fetch_one(&mut *tx)
        .await?;

        let order_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO customer_order
                (customer_name, customer_email, status, payment_info_id, shipping_info_id,
                 total_cents)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(&order.customer_name)
        .bind(&order.customer_email)
        .bind(&order.status)
        .bind(payment_info_id)
        .bind(shipping_info_id)
        .bind(order.total_amount.cents())
        .fetch_one(&mut *tx)
        .await?;

        for line in &order.lines {
            sqlx::query(
                r#"
                INSERT INTO customer_order_line_item
                    (order_id, item_number, item_name, quantity, unit_price_cents)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(order_id)
            .bind(line.item_number.as_i64())
            .bind(&line.item_name)
            .bind(i64::from(line.quantity))
            .bind(line.unit_price.cents())
            .execute(&mut *tx)
            .await?;
        }

        if order.stock_policy == StockPolicy::Decrement {
            // Item rows are locked in item-number order so that two orders
            // touching the same items cannot deadlock each other.
            let mut lines: Vec<_> = order.lines.iter().collect();
            lines.sort_by_key(|line| line.item_number);
            for line in lines {
                Self::decrement_stock(&mut tx, line.item_number, line.quantity).await?;
            }
        }

        tx.commit().await?;
        Ok(OrderId::new(order_id))
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<OrderRecord>> {
        let sql = format!("{ORDER_SELECT} WHERE o.id = $1");
        let row = sqlx::query(&sql)
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let mut orders = vec![Self::row_to_order(&row)?];
        self.attach_line_items(&mut orders).await?;
        Ok(orders.pop())
    }

    async fn list_orders_after(
        &self,
        after: Option<OrderId>,
        limit: usize,
    ) -> Result<Vec<OrderRecord>> {
        let sql = format!("{ORDER_SELECT} WHERE o.id > $1 ORDER BY o.id ASC LIMIT $2");
        let rows = sqlx::query(&sql)
            .bind(after.map_or(0, |id| id.as_i64()))
            .bind(i64::try_from(limit).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await?;

        let mut orders = rows
            .iter()
            .map(Self::row_to_order)
            .collect::<Result<Vec<_>>>()?;
        self.attach_line_items(&mut orders).await?;
        Ok(orders)
    }

    async fn list_inventory(&self) -> Result<Vec<InventoryRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT item_number, name, description, unit_price_cents, available_quantity
            FROM inventory_item
            ORDER BY item_number ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_inventory).collect()
    }

    async fn upsert_inventory(&self, records: Vec<InventoryRecord>) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        for record in &records {
            sqlx::query(
                r#"
                INSERT INTO inventory_item
                    (item_number, name, description, unit_price_cents, available_quantity)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (item_number) DO UPDATE
                SET name = EXCLUDED.name,
                    description = EXCLUDED.description,
                    unit_price_cents = EXCLUDED.unit_price_cents,
                    available_quantity = EXCLUDED.available_quantity
                "#,
            )
            .bind(record.item_number.as_i64())
            .bind(&record.name)
            .bind(&record.description)
            .bind(record.unit_price.cents())
            .bind(i64::from(record.available_quantity))
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
