//! Event Store Errors
//!
//! Error types for event store operations.

/// Errors that can occur in the event store
#[derive(Debug, thiserror::Error)]
pub enum EventStoreError {
    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid event data
    #[error("Invalid event data: {0}")]
    InvalidEventData(String),
}
