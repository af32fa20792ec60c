//! Shipping side of order placement.
//!
//! The consumer turns each `OrderCreated` event into a [`ShipmentRecord`]
//! keyed by order id. Delivery is at-least-once, so writes are upserts and a
//! redelivered event leaves exactly one record. Events lost between commit
//! and publish are recovered by [`ShipmentReconciler`].

pub mod config;
pub mod consumer;
pub mod error;
pub mod http;
pub mod memory;
pub mod postgres;
pub mod reconcile;
pub mod record;
pub mod store;

pub use config::ConsumerConfig;
pub use consumer::{HandleOutcome, RedeliveryPolicy, ShippingConsumer};
pub use error::{Result, ShippingError};
pub use memory::InMemoryShipmentStore;
pub use postgres::PostgresShipmentStore;
pub use reconcile::{ReconcileReport, ShipmentReconciler};
pub use record::ShipmentRecord;
pub use store::ShipmentStore;
