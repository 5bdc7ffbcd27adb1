//! Error handling module
//!
//! Centralized error types for the library surface.

/// Application-wide Result type
pub type AppResult<T> = Result<T, AppError>;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] crate::domain::DomainError),

    #[error(transparent)]
    Amount(#[from] crate::domain::AmountError),

    #[error("Event store error: {0}")]
    EventStore(#[from] crate::event_store::EventStoreError),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

impl AppError {
    /// True when the error is a rejected request rather than an internal
    /// failure
    pub fn is_client_error(&self) -> bool {
        match self {
            AppError::Domain(e) => e.is_client_error(),
            AppError::Amount(_) => true,
            AppError::EventStore(_) | AppError::Config(_) => false,
        }
    }
}
