use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use uuid::Uuid;

use crate::Result;

/// An event as it travels over the bus.
///
/// Mirrors the envelope shape common to managed event buses: a source, a
/// type used for routing, and a free-form JSON detail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusEvent {
    /// Unique identifier for this delivery envelope.
    pub id: Uuid,

    /// The emitting service (e.g., "order-service").
    pub source: String,

    /// The type of the event (e.g., "OrderCreated").
    #[serde(rename = "type")]
    pub event_type: String,

    /// When the event was created.
    pub time: DateTime<Utc>,

    /// The event payload as JSON.
    pub detail: serde_json::Value,
}

impl BusEvent {
    /// Creates an event with a fresh id, serializing `detail`.
    pub fn new(
        source: impl Into<String>,
        event_type: impl Into<String>,
        detail: &impl Serialize,
    ) -> Result<Self> {
        Ok(Self {
            id: Uuid::new_v4(),
            source: source.into(),
            event_type: event_type.into(),
            time: Utc::now(),
            detail: serde_json::to_value(detail)?,
        })
    }

    /// Deserializes the detail into a typed payload.
    pub fn decode_detail<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value(self.detail.clone())?)
    }

    /// Returns true if the event has the given source and type.
    pub fn is(&self, source: &str, event_type: &str) -> bool {
        self.source == source && self.event_type == event_type
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    #[serde(rename_all = "camelCase")]
    struct Detail {
        order_id: i64,
    }

    #[test]
    fn test_envelope_wire_shape() {
        let event = BusEvent::new("order-service", "OrderCreated", &Detail { order_id: 7 }).unwrap();
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["source"], "order-service");
        assert_eq!(json["type"], "OrderCreated");
        assert_eq!(json["detail"]["orderId"], 7);
        assert!(json.get("event_type").is_none());
    }

    #[test]
    fn test_decode_detail() {
        let event = BusEvent::new("order-service", "OrderCreated", &Detail { order_id: 7 }).unwrap();
        let detail: Detail = event.decode_detail().unwrap();
        assert_eq!(detail, Detail { order_id: 7 });
        assert!(event.is("order-service", "OrderCreated"));
        assert!(!event.is("order-service", "OrderCancelled"));
    }

    #[test]
    fn test_decode_detail_mismatch_is_error() {
        let event = BusEvent::new("x", "y", &serde_json::json!({"other": true})).unwrap();
        assert!(event.decode_detail::<Detail>().is_err());
    }
}
