use serde::{Deserialize, Serialize};

/// Identifier of a placed order.
///
/// Order ids are generated by the order store as a monotonically increasing
/// sequence, so they are plain integers rather than UUIDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(i64);

impl OrderId {
    /// Wraps a raw order id.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw id.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for OrderId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<OrderId> for i64 {
    fn from(id: OrderId) -> Self {
        id.0
    }
}

/// Catalog key of an inventory item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemNumber(i64);

impl ItemNumber {
    /// Wraps a raw item number.
    pub fn new(number: i64) -> Self {
        Self(number)
    }

    /// Returns the raw item number.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for ItemNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ItemNumber {
    fn from(number: i64) -> Self {
        Self(number)
    }
}

impl From<ItemNumber> for i64 {
    fn from(number: ItemNumber) -> Self {
        number.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_id_ordering_follows_sequence() {
        assert!(OrderId::new(1) < OrderId::new(2));
        assert_eq!(OrderId::from(7_i64).as_i64(), 7);
    }

    #[test]
    fn order_id_serializes_as_plain_number() {
        let json = serde_json::to_string(&OrderId::new(42)).unwrap();
        assert_eq!(json, "42");
    }

    #[test]
    fn item_number_display() {
        assert_eq!(ItemNumber::new(10001).to_string(), "10001");
    }

    #[test]
    fn item_number_deserializes_from_number() {
        let n: ItemNumber = serde_json::from_str("10002").unwrap();
        assert_eq!(n, ItemNumber::new(10002));
    }
}
