use std::sync::Arc;

use async_trait::async_trait;

use crate::{BusEvent, Result};

/// Capability to hand an event to the bus.
///
/// A successful return means the bus accepted the event, not that any
/// consumer processed it.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publishes one event.
    async fn publish(&self, event: &BusEvent) -> Result<()>;
}

#[async_trait]
impl<T: EventPublisher + ?Sized> EventPublisher for Arc<T> {
    async fn publish(&self, event: &BusEvent) -> Result<()> {
        (**self).publish(event).await
    }
}

/// Publisher used when no bus is configured: logs and drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledPublisher;

#[async_trait]
impl EventPublisher for DisabledPublisher {
    async fn publish(&self, event: &BusEvent) -> Result<()> {
        tracing::warn!(
            event_id = %event.id,
            event_type = %event.event_type,
            "event bus disabled, dropping event"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_publisher_accepts_everything() {
        let publisher: Arc<dyn EventPublisher> = Arc::new(DisabledPublisher);
        let event = BusEvent::new("order-service", "OrderCreated", &serde_json::json!({})).unwrap();
        assert!(publisher.publish(&event).await.is_ok());
    }
}
