//! Order placement saga.
//!
//! A placement runs these steps strictly in sequence:
//! 1. Validate the request
//! 2. Enrich lines from the inventory snapshot and check stock
//! 3. Authorize the total with the payment service
//! 4. Persist the order, its snapshots and the stock decrement atomically
//! 5. Publish `OrderCreated` (best-effort)
//!
//! There is no compensation: nothing is written before step 4, and step 4
//! is a single local transaction. An authorization whose order fails to
//! persist is logged for manual follow-up.

pub mod coordinator;
pub mod error;
pub mod instance;
pub mod services;
pub mod state;

pub use coordinator::{OrderConfirmation, OrderOrchestrator, SagaSettings};
pub use error::{ErrorKind, Fault, OrderError, Result};
pub use instance::PlacementSaga;
pub use services::{
    HttpInventoryClient, HttpPaymentAuthorizer, InMemoryInventoryClient, InventoryClient,
    PaymentAuthorizer, PaymentToken, StoreInventoryClient, StubPaymentAuthorizer,
};
pub use state::SagaState;
