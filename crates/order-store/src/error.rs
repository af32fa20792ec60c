use common::ItemNumber;
use thiserror::Error;

/// Errors that can occur when reading or writing the order store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The guarded decrement found fewer units than the order needs.
    #[error(
        "Stock exhausted for item {item_number}: requested {requested}, available {available}"
    )]
    StockExhausted {
        item_number: ItemNumber,
        requested: u32,
        available: u32,
    },

    /// The order references an item that has no row in the local item table.
    #[error("Unknown inventory item: {0}")]
    UnknownItem(ItemNumber),

    /// A stored row holds a value outside its domain.
    #[error("Corrupt row: {0}")]
    CorruptRow(String),

    /// The store could not complete the write.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl StoreError {
    /// Returns true when the write lost a race for stock.
    pub fn is_stock_conflict(&self) -> bool {
        matches!(self, StoreError::StockExhausted { .. })
    }
}

/// Result type for order store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
