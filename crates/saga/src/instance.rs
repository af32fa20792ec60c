//! A single run of the order placement saga.

use std::time::{Duration, Instant};

use crate::state::SagaState;

/// Tracks one order placement as it moves through [`SagaState`].
///
/// Lives only for the duration of the request; nothing about it is
/// persisted.
#[derive(Debug, Clone)]
pub struct PlacementSaga {
    state: SagaState,
    failed_at: Option<SagaState>,
    published: bool,
    started: Instant,
}

impl Default for PlacementSaga {
    fn default() -> Self {
        Self::new()
    }
}

impl PlacementSaga {
    /// Starts a saga in `Validating`.
    pub fn new() -> Self {
        Self {
            state: SagaState::Validating,
            failed_at: None,
            published: false,
            started: Instant::now(),
        }
    }

    /// Moves to the next state and returns it.
    ///
    /// Terminal states stay where they are.
    pub fn advance(&mut self) -> SagaState {
        if let Some(next) = self.state.next() {
            tracing::debug!(from = %self.state, to = %next, "saga step completed");
            self.state = next;
        }
        self.state
    }

    /// Records that the current step failed and enters `Failed`.
    pub fn fail(&mut self) {
        if self.state.is_terminal() {
            return;
        }
        self.failed_at = Some(self.state);
        self.state = SagaState::Failed;
    }

    /// Records that the `OrderCreated` event was accepted by the bus.
    pub fn mark_published(&mut self) {
        self.published = true;
    }

    /// Returns the current state.
    pub fn state(&self) -> SagaState {
        self.state
    }

    /// Returns the step that failed, if any.
    pub fn failed_at(&self) -> Option<SagaState> {
        self.failed_at
    }

    /// Returns true if the event reached the bus.
    pub fn published(&self) -> bool {
        self.published
    }

    /// Time since the saga started.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}
