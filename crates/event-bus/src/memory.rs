use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{BusError, BusEvent, EventPublisher, Result};

#[derive(Debug, Default)]
struct RecordingState {
    events: Vec<BusEvent>,
    fail_on_publish: bool,
}

/// In-memory publisher that keeps every accepted event.
#[derive(Debug, Clone, Default)]
pub struct RecordingPublisher {
    state: Arc<RwLock<RecordingState>>,
}

impl RecordingPublisher {
    /// Creates a new recording publisher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the publisher to reject every following publish.
    pub async fn set_fail_on_publish(&self, fail: bool) {
        self.state.write().await.fail_on_publish = fail;
    }

    /// Returns the events accepted so far.
    pub async fn published(&self) -> Vec<BusEvent> {
        self.state.read().await.events.clone()
    }

    /// Returns the number of events accepted so far.
    pub async fn published_count(&self) -> usize {
        self.state.read().await.events.len()
    }
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish(&self, event: &BusEvent) -> Result<()> {
        let mut state = self.state.write().await;
        if state.fail_on_publish {
            return Err(BusError::Unavailable("publish rejected".to_string()));
        }
        state.events.push(event.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_and_fails_on_demand() {
        let publisher = RecordingPublisher::new();
        let event = BusEvent::new("order-service", "OrderCreated", &serde_json::json!({})).unwrap();

        publisher.publish(&event).await.unwrap();
        assert_eq!(publisher.published_count().await, 1);

        publisher.set_fail_on_publish(true).await;
        assert!(publisher.publish(&event).await.is_err());
        assert_eq!(publisher.published().await, vec![event]);
    }
}
