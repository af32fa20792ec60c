//! Order store: the relational record of placed orders.
//!
//! An order is written together with its payment snapshot, shipping
//! snapshot, line items and (optionally) the stock decrement in a single
//! transaction. Two implementations share the [`OrderStore`] trait:
//! [`InMemoryOrderStore`] for tests and local runs, and
//! [`PostgresOrderStore`] for production.

pub mod error;
pub mod memory;
pub mod model;
pub mod postgres;
pub mod store;

pub use error::{Result, StoreError};
pub use memory::{FailPoint, InMemoryOrderStore, RowCounts};
pub use model::{LineItemRecord, NewOrder, OrderRecord, StockPolicy};
pub use postgres::PostgresOrderStore;
pub use store::{OrderStore, OrderStoreExt};
