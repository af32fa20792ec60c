//! Domain error types.

use common::ItemNumber;
use thiserror::Error;

/// First structural problem found in an order request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or blank after trimming.
    #[error("{field} is required")]
    Required { field: String },

    /// A numeric field is not a positive integer.
    #[error("{field} must be a positive integer")]
    NotPositiveInteger { field: String },

    /// The order has no line items.
    #[error("items must be a non-empty array")]
    NoItems,
}

impl ValidationError {
    pub(crate) fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }

    pub(crate) fn not_positive(field: impl Into<String>) -> Self {
        ValidationError::NotPositiveInteger {
            field: field.into(),
        }
    }

    /// Returns the path of the offending field.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field } | ValidationError::NotPositiveInteger { field } => {
                field
            }
            ValidationError::NoItems => "items",
        }
    }
}

/// A requested line does not match the inventory snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// The item number is absent from the snapshot.
    #[error("Item {item_number} not found in inventory")]
    ItemNotFound { item_number: ItemNumber },

    /// More units were requested than the snapshot shows available.
    #[error("Not enough stock for item {item_name} (have {available}, need {requested})")]
    InsufficientStock {
        item_number: ItemNumber,
        item_name: String,
        requested: u64,
        available: u32,
    },
}
