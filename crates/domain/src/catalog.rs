//! Inventory snapshot records and line enrichment.

use std::collections::HashMap;

use common::ItemNumber;
use serde::{Deserialize, Serialize};

use crate::error::CatalogError;
use crate::money::Money;
use crate::request::LineRequest;

/// An item as reported by the inventory service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryRecord {
    pub item_number: ItemNumber,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(with = "crate::money::decimal")]
    pub unit_price: Money,
    pub available_quantity: u32,
}

impl InventoryRecord {
    /// Creates a record without a description.
    pub fn new(
        item_number: i64,
        name: impl Into<String>,
        unit_price: Money,
        available_quantity: u32,
    ) -> Self {
        Self {
            item_number: ItemNumber::new(item_number),
            name: name.into(),
            description: None,
            unit_price,
            available_quantity,
        }
    }
}

/// A requested line joined with authoritative inventory data.
///
/// Lives only for the duration of one placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichedLineItem {
    pub item_number: ItemNumber,
    pub item_name: String,
    pub quantity: u32,
    pub unit_price: Money,
    /// Availability at lookup time.
    pub available_quantity: u32,
}

impl EnrichedLineItem {
    /// Returns `unit_price * quantity`.
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }
}

/// Joins requested lines with an inventory snapshot.
///
/// Fails on the first line whose item is missing, or whose cumulative
/// requested quantity (across repeated lines for the same item) exceeds the
/// snapshot's availability.
pub fn enrich(
    lines: &[LineRequest],
    snapshot: &[InventoryRecord],
) -> Result<Vec<EnrichedLineItem>, CatalogError> {
    let by_number: HashMap<ItemNumber, &InventoryRecord> = snapshot
        .iter()
        .map(|record| (record.item_number, record))
        .collect();
    let mut requested: HashMap<ItemNumber, u64> = HashMap::new();

    lines
        .iter()
        .map(|line| {
            let record =
                by_number
                    .get(&line.item_number)
                    .ok_or(CatalogError::ItemNotFound {
                        item_number: line.item_number,
                    })?;

            let total = requested.entry(line.item_number).or_insert(0);
            *total += u64::from(line.quantity);
            if *total > u64::from(record.available_quantity) {
                return Err(CatalogError::InsufficientStock {
                    item_number: line.item_number,
                    item_name: record.name.clone(),
                    requested: *total,
                    available: record.available_quantity,
                });
            }

            Ok(EnrichedLineItem {
                item_number: line.item_number,
                item_name: record.name.clone(),
                quantity: line.quantity,
                unit_price: record.unit_price,
                available_quantity: record.available_quantity,
            })
        })
        .collect()
}

/// Sums `quantity * unit_price` over enriched lines.
pub fn order_total(lines: &[EnrichedLineItem]) -> Money {
    lines.iter().map(EnrichedLineItem::line_total).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> Vec<InventoryRecord> {
        vec![
            InventoryRecord::new(10001, "Laptop 15\"", Money::from_cents(99999), 50),
            InventoryRecord::new(10002, "Wireless Mouse", Money::from_cents(2999), 1),
        ]
    }

    fn line(item: i64, quantity: u32) -> LineRequest {
        LineRequest {
            item_number: ItemNumber::new(item),
            quantity,
        }
    }

    #[test]
    fn test_enrich_uses_snapshot_price_and_name() {
        let lines = enrich(&[line(10001, 2)], &snapshot()).unwrap();
        assert_eq!(lines[0].item_name, "Laptop 15\"");
        assert_eq!(lines[0].unit_price, Money::from_cents(99999));
        assert_eq!(lines[0].available_quantity, 50);
        assert_eq!(order_total(&lines), Money::from_cents(199998));
    }

    #[test]
    fn test_missing_item() {
        let err = enrich(&[line(10001, 1), line(99999, 1)], &snapshot()).unwrap_err();
        assert_eq!(
            err,
            CatalogError::ItemNotFound {
                item_number: ItemNumber::new(99999)
            }
        );
    }

    #[test]
    fn test_insufficient_stock_message() {
        let err = enrich(&[line(10002, 2)], &snapshot()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Not enough stock for item Wireless Mouse (have 1, need 2)"
        );
    }

    #[test]
    fn test_repeated_lines_are_checked_cumulatively() {
        let err = enrich(&[line(10002, 1), line(10002, 1)], &snapshot()).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::InsufficientStock { requested: 2, .. }
        ));
    }

    #[test]
    fn test_exact_availability_is_allowed() {
        assert!(enrich(&[line(10002, 1)], &snapshot()).is_ok());
    }

    #[test]
    fn test_inventory_wire_format() {
        let json = serde_json::json!([{
            "itemNumber": 10004,
            "name": "Monitor 27\"",
            "description": "4K Ultra HD Monitor",
            "availableQuantity": 30,
            "unitPrice": 349.99
        }]);
        let records: Vec<InventoryRecord> = serde_json::from_value(json).unwrap();
        assert_eq!(records[0].unit_price.cents(), 34999);
        assert_eq!(records[0].description.as_deref(), Some("4K Ultra HD Monitor"));
    }
}
