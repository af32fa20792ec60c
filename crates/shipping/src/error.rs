use event_bus::BusError;
use order_store::StoreError;
use thiserror::Error;

/// Errors raised while recording or reconciling shipments.
#[derive(Debug, Error)]
pub enum ShippingError {
    /// The event detail is not a valid `OrderCreated` payload.
    #[error("Undecodable event detail: {0}")]
    Decode(#[source] BusError),

    /// The shipment store is unavailable.
    #[error("Shipment store unavailable: {0}")]
    Unavailable(String),

    /// A stored row holds a value outside its domain.
    #[error("Corrupt shipment row: {0}")]
    CorruptRow(String),

    /// Reading placed orders failed during reconciliation.
    #[error("Order store error: {0}")]
    Orders(#[from] StoreError),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl ShippingError {
    /// Returns true when redelivering the same event may succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            ShippingError::Decode(_) | ShippingError::CorruptRow(_)
        )
    }
}

/// Result type for shipping operations.
pub type Result<T> = std::result::Result<T, ShippingError>;
