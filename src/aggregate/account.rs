//! Account Aggregate
//!
//! Account is the replay target for the event log. State is derived from
//! events, never directly mutated; an account with no history rebuilds to
//! the zero baseline rather than an error.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{AccountEvent, Amount, Balance};

use super::Aggregate;

/// Account Aggregate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    account_id: Uuid,
    balance: Balance,
    version: u64,
}

impl Account {
    /// Current balance (derived from events)
    pub fn balance(&self) -> Balance {
        self.balance
    }

    /// Check if the balance covers a withdrawal of `amount`
    pub fn can_withdraw(&self, amount: &Amount) -> bool {
        self.balance.is_sufficient_for(amount)
    }
}

impl Aggregate for Account {
    type Event = AccountEvent;

    fn aggregate_type() -> &'static str {
        "Account"
    }

    fn with_id(id: Uuid) -> Self {
        Self {
            account_id: id,
            balance: Balance::zero(),
            version: 0,
        }
    }

    fn id(&self) -> Uuid {
        self.account_id
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn apply(mut self, event: Self::Event, version: u64) -> Self {
        match event {
            AccountEvent::Deposited { amount, .. } => {
                self.balance = self.balance.credit(amount);
            }
            AccountEvent::Withdrawn { amount, .. } => {
                // Compensating withdrawals may overdraw; the fold records
                // every accepted event faithfully.
                self.balance = self.balance.debit(amount);
            }
        }

        self.version = version;
        self
    }
}
