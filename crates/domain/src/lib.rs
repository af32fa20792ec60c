//! Domain layer for storefront order placement.
//!
//! Everything in this crate is pure: no I/O, no clocks. It covers
//! - `Money` in integer cents, with a decimal wire representation
//! - parsing and validating an incoming order request
//! - joining requested lines with an inventory snapshot and totalling them
//! - deriving the shipment manifest carried by the `OrderCreated` event

pub mod catalog;
pub mod error;
pub mod money;
pub mod request;
pub mod shipment;

pub use catalog::{EnrichedLineItem, InventoryRecord, enrich, order_total};
pub use common::{ItemNumber, OrderId};
pub use error::{CatalogError, ValidationError};
pub use money::Money;
pub use request::{
    LineItemRequest, LineRequest, NumericInput, OrderRequest, PaymentDetails, PaymentInfoRequest,
    ShippingAddress, ShippingInfoRequest, ValidOrder,
};
pub use shipment::{
    ORDER_CREATED, ORDER_SERVICE_SOURCE, OrderCreatedDetail, Packet, UNIT_WEIGHT,
};
