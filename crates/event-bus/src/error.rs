use thiserror::Error;

/// Errors that can occur when publishing to the event bus.
#[derive(Debug, Error)]
pub enum BusError {
    /// The in-process bus has no receiver left.
    #[error("Event bus closed")]
    Closed,

    /// The in-process bus already holds as many undelivered events as it
    /// can buffer.
    #[error("Event bus full")]
    Full,

    /// The HTTP request could not be sent or completed.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The bus endpoint answered with a non-success status.
    #[error("Event bus rejected the event with status {status}")]
    Rejected { status: u16 },

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The publisher is unavailable.
    #[error("Event bus unavailable: {0}")]
    Unavailable(String),
}

/// Result type for event bus operations.
pub type Result<T> = std::result::Result<T, BusError>;
