//! Order placement error taxonomy.

use common::ItemNumber;
use domain::{CatalogError, ValidationError};
use order_store::StoreError;
use serde::Serialize;
use thiserror::Error;

/// Errors that end an order placement.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The request is structurally invalid.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A requested item is not in the inventory snapshot.
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

    /// The payment service did not authorize the charge.
    #[error("Payment failed: {0}")]
    PaymentDeclined(String),

    /// A collaborating service could not be reached.
    #[error("{service} service unavailable: {reason}")]
    UpstreamUnavailable {
        service: &'static str,
        reason: String,
    },

    /// The order could not be written; nothing was persisted.
    #[error("Failed to save order: {0}")]
    Persistence(#[from] StoreError),
}

/// Stable, serializable discriminant of an [`OrderError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    Validation,
    ItemNotFound,
    InsufficientStock,
    PaymentDeclined,
    UpstreamUnavailable,
    Persistence,
}

impl ErrorKind {
    /// Returns the kind name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "Validation",
            ErrorKind::ItemNotFound => "ItemNotFound",
            ErrorKind::InsufficientStock => "InsufficientStock",
            ErrorKind::PaymentDeclined => "PaymentDeclined",
            ErrorKind::UpstreamUnavailable => "UpstreamUnavailable",
            ErrorKind::Persistence => "Persistence",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Who has to act to resolve a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// The caller must change the request.
    Client,
    /// The caller must use different payment details.
    Payment,
    /// Transient or internal; retrying later may succeed.
    Server,
}

impl OrderError {
    pub(crate) fn upstream(service: &'static str, reason: impl ToString) -> Self {
        OrderError::UpstreamUnavailable {
            service,
            reason: reason.to_string(),
        }
    }

    /// Returns the error kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            OrderError::Validation(_) => ErrorKind::Validation,
            OrderError::ItemNotFound { .. } => ErrorKind::ItemNotFound,
            OrderError::InsufficientStock { .. } => ErrorKind::InsufficientStock,
            OrderError::PaymentDeclined(_) => ErrorKind::PaymentDeclined,
            OrderError::UpstreamUnavailable { .. } => ErrorKind::UpstreamUnavailable,
            OrderError::Persistence(_) => ErrorKind::Persistence,
        }
    }

    /// Returns who has to act to resolve the failure.
    pub fn fault(&self) -> Fault {
        match self.kind() {
            ErrorKind::Validation | ErrorKind::ItemNotFound | ErrorKind::InsufficientStock => {
                Fault::Client
            }
            ErrorKind::PaymentDeclined => Fault::Payment,
            ErrorKind::UpstreamUnavailable | ErrorKind::Persistence => Fault::Server,
        }
    }

    /// Message safe to show the customer.
    ///
    /// Client and payment faults are actionable and returned verbatim;
    /// server faults hide their internals.
    pub fn public_message(&self) -> String {
        match self {
            OrderError::UpstreamUnavailable { service, .. } => {
                format!("The {service} service is temporarily unavailable. Please try again.")
            }
            OrderError::Persistence(_) => "Failed to save order. Please try again.".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<CatalogError> for OrderError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::ItemNotFound { item_number } => OrderError::ItemNotFound { item_number },
            CatalogError::InsufficientStock {
                item_number,
                item_name,
                requested,
                available,
            } => OrderError::InsufficientStock {
                item_number,
                item_name,
                requested,
                available,
            },
        }
    }
}

/// Convenience type alias for order placement results.
pub type Result<T> = std::result::Result<T, OrderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_and_fault() {
        let err = OrderError::PaymentDeclined("card expired".to_string());
        assert_eq!(err.kind(), ErrorKind::PaymentDeclined);
        assert_eq!(err.fault(), Fault::Payment);
        assert_eq!(err.public_message(), "Payment failed: card expired");
    }

    #[test]
    fn test_server_faults_hide_internals() {
        let err = OrderError::Persistence(StoreError::Unavailable(
            "connection reset by peer".to_string(),
        ));
        assert_eq!(err.fault(), Fault::Server);
        assert!(!err.public_message().contains("connection reset"));

        let err = OrderError::upstream("inventory", "dns failure");
        assert_eq!(
            err.public_message(),
            "The inventory service is temporarily unavailable. Please try again."
        );
    }

    #[test]
    fn test_catalog_errors_keep_their_message() {
        let err = OrderError::from(CatalogError::InsufficientStock {
            item_number: ItemNumber::new(10001),
            item_name: "Laptop 15\"".to_string(),
            requested: 2,
            available: 1,
        });
        assert_eq!(err.kind(), ErrorKind::InsufficientStock);
        assert_eq!(
            err.public_message(),
            "Not enough stock for item Laptop 15\" (have 1, need 2)"
        );
    }

    #[test]
    fn test_kind_serializes_as_name() {
        assert_eq!(
            serde_json::to_string(&ErrorKind::UpstreamUnavailable).unwrap(),
            "\"UpstreamUnavailable\""
        );
    }
}
