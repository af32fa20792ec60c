//! Capability clients the orchestrator depends on.

pub mod inventory;
pub mod payment;

pub use inventory::{
    HttpInventoryClient, InMemoryInventoryClient, InventoryClient, StoreInventoryClient,
};
pub use payment::{
    HttpPaymentAuthorizer, PaymentAuthorizer, PaymentToken, StubPaymentAuthorizer,
};
