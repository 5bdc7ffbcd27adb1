//! Domain Error Types
//!
//! Pure domain errors that don't depend on infrastructure.

use rust_decimal::Decimal;
use thiserror::Error;

/// Business rule violations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    #[error("Insufficient balance: required {required}, available {available}")]
    InsufficientBalance {
        required: Decimal,
        available: Decimal,
    },

    #[error("Cannot transfer to the same account")]
    SameAccountTransfer,
}

impl DomainError {
    /// Build an insufficient-balance rejection
    pub fn insufficient_balance(required: Decimal, available: Decimal) -> Self {
        Self::InsufficientBalance {
            required,
            available,
        }
    }

    /// True when the error is caused by the caller's request rather than
    /// an internal failure
    pub fn is_client_error(&self) -> bool {
        match self {
            DomainError::InsufficientBalance { .. } => true,
            DomainError::SameAccountTransfer => true,
        }
    }
}
