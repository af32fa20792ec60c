//! Saga state machine.

use serde::{Deserialize, Serialize};

/// The state of an order placement in its lifecycle.
///
/// State transitions:
/// ```text
/// Validating ──► Enriching ──► Authorizing ──► Persisting ──► Publishing ──► Done
///     │              │              │               │
///     └──────────────┴──────────────┴───────────────┴──► Failed
/// ```
///
/// Publishing never fails the saga: a publish error is logged and the saga
/// still reaches `Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SagaState {
    /// The request is being checked structurally.
    #[default]
    Validating,

    /// Lines are being joined with the inventory snapshot.
    Enriching,

    /// The payment service is authorizing the total.
    Authorizing,

    /// The order is being written in one transaction.
    Persisting,

    /// The `OrderCreated` event is being handed to the bus.
    Publishing,

    /// The order is placed (terminal state).
    Done,

    /// A step failed before the order was committed (terminal state).
    Failed,
}

impl SagaState {
    /// Returns the state that follows on success, or `None` for terminal
    /// states.
    pub fn next(&self) -> Option<SagaState> {
        match self {
            SagaState::Validating => Some(SagaState::Enriching),
            SagaState::Enriching => Some(SagaState::Authorizing),
            SagaState::Authorizing => Some(SagaState::Persisting),
            SagaState::Persisting => Some(SagaState::Publishing),
            SagaState::Publishing => Some(SagaState::Done),
            SagaState::Done | SagaState::Failed => None,
        }
    }

    /// Returns true if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SagaState::Done | SagaState::Failed)
    }

    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            SagaState::Validating => "Validating",
            SagaState::Enriching => "Enriching",
            SagaState::Authorizing => "Authorizing",
            SagaState::Persisting => "Persisting",
            SagaState::Publishing => "Publishing",
            SagaState::Done => "Done",
            SagaState::Failed => "Failed",
        }
    }
}

impl std::fmt::Display for SagaState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
