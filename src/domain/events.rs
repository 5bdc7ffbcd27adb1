//! Domain Events
//!
//! Event definitions for Event Sourcing.
//! Events are immutable facts that have happened in the system.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Account-related events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AccountEvent {
    /// Money was deposited into the account (balance increased)
    Deposited {
        account_id: Uuid,
        amount: Decimal,
        recorded_at: DateTime<Utc>,
    },

    /// Money was withdrawn from the account (balance decreased)
    Withdrawn {
        account_id: Uuid,
        amount: Decimal,
        recorded_at: DateTime<Utc>,
    },
}

impl AccountEvent {
    /// Build a deposit fact for `account_id`
    pub fn deposited(account_id: Uuid, amount: Decimal) -> Self {
        Self::Deposited {
            account_id,
            amount,
            recorded_at: Utc::now(),
        }
    }

    /// Build a withdrawal fact for `account_id`
    pub fn withdrawn(account_id: Uuid, amount: Decimal) -> Self {
        Self::Withdrawn {
            account_id,
            amount,
            recorded_at: Utc::now(),
        }
    }

    /// Get the event type as a string
    pub fn event_type(&self) -> &'static str {
        match self {
            AccountEvent::Deposited { .. } => "Deposited",
            AccountEvent::Withdrawn { .. } => "Withdrawn",
        }
    }

    /// Get the account ID this event relates to
    pub fn account_id(&self) -> Uuid {
        match self {
            AccountEvent::Deposited { account_id, .. } => *account_id,
            AccountEvent::Withdrawn { account_id, .. } => *account_id,
        }
    }

    /// Get the amount this event moves
    pub fn amount(&self) -> Decimal {
        match self {
            AccountEvent::Deposited { amount, .. } => *amount,
            AccountEvent::Withdrawn { amount, .. } => *amount,
        }
    }
}
