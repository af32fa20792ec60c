//! Event bus plumbing for order events.
//!
//! Publishing is best-effort: the order service hands a [`BusEvent`] to an
//! [`EventPublisher`] after the order is committed and never rolls back on
//! a publish failure. Consumers must therefore tolerate both loss (handled
//! by reconciliation) and redelivery (handled by idempotent writes).

pub mod channel;
pub mod error;
pub mod event;
pub mod http;
pub mod memory;
pub mod publisher;

pub use channel::{ChannelEventBus, EventStream};
pub use error::{BusError, Result};
pub use event::BusEvent;
pub use http::HttpEventPublisher;
pub use memory::RecordingPublisher;
pub use publisher::{DisabledPublisher, EventPublisher};
