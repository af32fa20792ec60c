use async_trait::async_trait;
use common::OrderId;
use sqlx::{PgPool, Row, postgres::PgRow};

use crate::{Result, ShipmentRecord, ShippingError, store::ShipmentStore};

/// PostgreSQL-backed shipment store.
#[derive(Clone)]
pub struct PostgresShipmentStore {
    pool: PgPool,
}

impl PostgresShipmentStore {
    /// Creates a new PostgreSQL shipment store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the shipping database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations/shipping")
            .run(&self.pool)
            .await?;
        Ok(())
    }

    fn row_to_record(row: &PgRow) -> Result<ShipmentRecord> {
        let packet_count: i32 = row.try_get("packet_count")?;
        Ok(ShipmentRecord {
            order_id: OrderId::new(row.try_get("order_id")?),
            business_id: row.try_get("business_id")?,
            shipment_address: row.try_get("shipment_address")?,
            payment_token: row.try_get("payment_token")?,
            packet_count: u32::try_from(packet_count).map_err(|_| {
                ShippingError::CorruptRow(format!("packet_count out of range: {packet_count}"))
            })?,
            weight_per_packet: row.try_get("weight_per_packet")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[async_trait]
impl ShipmentStore for PostgresShipmentStore {
    #[tracing::instrument(skip(self, record), fields(order_id = %record.order_id))]
    async fn upsert(&self, record: ShipmentRecord) -> Result<()> {
        let packet_count = i32::try_from(record.packet_count).map_err(|_| {
            ShippingError::CorruptRow(format!("packet_count out of range: {}", record.packet_count))
        })?;

        sqlx::query(
            r#"
            INSERT INTO shipment
                (order_id, business_id, shipment_address, payment_token, packet_count,
                 weight_per_packet, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (order_id) DO UPDATE
            SET business_id = EXCLUDED.business_id,
                shipment_address = EXCLUDED.shipment_address,
                payment_token = EXCLUDED.payment_token,
                packet_count = EXCLUDED.packet_count,
                weight_per_packet = EXCLUDED.weight_per_packet,
                created_at = EXCLUDED.created_at
            "#,
        )
        .bind(record.order_id.as_i64())
        .bind(&record.business_id)
        .bind(&record.shipment_address)
        .bind(&record.payment_token)
        .bind(packet_count)
        .bind(record.weight_per_packet)
        .bind(record.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, order_id: OrderId) -> Result<Option<ShipmentRecord>> {
        let row = sqlx::query(
            r#"
            SELECT order_id, business_id, shipment_address, payment_token, packet_count,
                   weight_per_packet, created_at
            FROM shipment
            WHERE order_id = $1
            "#,
        )
        .bind(order_id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::row_to_record).transpose()
    }

    async fn count(&self) -> Result<usize> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM shipment")
            .fetch_one(&self.pool)
            .await?;
        Ok(usize::try_from(count).unwrap_or_default())
    }
}
