//! Command definitions
//!
//! Commands represent intentions to change the system state. They are
//! transient values, never persisted; each produces a forward event record
//! and the inverse record that undoes it.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{AccountEvent, Amount};
use crate::event_store::{EventStoreError, StoredEvent};

/// The kind of state change a command requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandKind {
    Deposit,
    Withdrawal,
}

/// Command to change an account's balance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Command {
    pub kind: CommandKind,
    pub account_id: Uuid,
    pub amount: Amount,
}

impl Command {
    pub fn deposit(account_id: Uuid, amount: Amount) -> Self {
        Self {
            kind: CommandKind::Deposit,
            account_id,
            amount,
        }
    }

    pub fn withdrawal(account_id: Uuid, amount: Amount) -> Self {
        Self {
            kind: CommandKind::Withdrawal,
            account_id,
            amount,
        }
    }

    /// Build the event record this command appends when executed at `version`
    pub fn forward_event(&self, version: u64) -> Result<StoredEvent, EventStoreError> {
        let event = match self.kind {
            CommandKind::Deposit => {
                AccountEvent::deposited(self.account_id, self.amount.value())
            }
            CommandKind::Withdrawal => {
                AccountEvent::withdrawn(self.account_id, self.amount.value())
            }
        };
        StoredEvent::new(self.account_id, version, event.event_type(), &event)
    }

    /// Build the compensating event record that undoes this command
    pub fn inverse_event(&self, version: u64) -> Result<StoredEvent, EventStoreError> {
        let event = match self.kind {
            CommandKind::Deposit => {
                AccountEvent::withdrawn(self.account_id, self.amount.value())
            }
            CommandKind::Withdrawal => {
                AccountEvent::deposited(self.account_id, self.amount.value())
            }
        };
        StoredEvent::new(self.account_id, version, event.event_type(), &event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn amount(value: i64) -> Amount {
        Amount::new(Decimal::new(value, 0)).unwrap()
    }

    #[test]
    fn test_deposit_forward_and_inverse() {
        let account_id = Uuid::new_v4();
        let command = Command::deposit(account_id, amount(100));

        let forward = command.forward_event(1).unwrap();
        assert_eq!(forward.event_type, "Deposited");
        assert_eq!(forward.aggregate_id, account_id);
        assert_eq!(forward.version, 1);

        let inverse = command.inverse_event(2).unwrap();
        assert_eq!(inverse.event_type, "Withdrawn");
        assert_eq!(inverse.version, 2);
    }

    #[test]
    fn test_withdrawal_forward_and_inverse() {
        let account_id = Uuid::new_v4();
        let command = Command::withdrawal(account_id, amount(50));

        assert_eq!(command.forward_event(1).unwrap().event_type, "Withdrawn");
        assert_eq!(command.inverse_event(2).unwrap().event_type, "Deposited");
    }
}
