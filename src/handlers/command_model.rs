//! Command Model
//!
//! Write side of the CQRS split. Validates commands against rebuilt state,
//! allocates versions from the global counter, appends to the log, and
//! refreshes the read model after every accepted command.

use std::sync::{Arc, Mutex, PoisonError};

use uuid::Uuid;

use crate::aggregate::Account;
use crate::domain::DomainError;
use crate::error::AppResult;
use crate::event_store::EventStore;
use crate::projection::{AccountEntity, EntityStore};
use crate::query::QueryModel;

use super::{Command, CommandKind};

/// Validating write model over the event store
pub struct CommandModel {
    store: Arc<dyn EventStore + Send + Sync>,
    query: QueryModel,
    entities: Arc<EntityStore>,
    // One counter across all aggregates. The guard also serializes the
    // whole validate-append-refresh sequence, so two concurrent
    // withdrawals cannot both pass the balance check.
    version_counter: Mutex<u64>,
}

impl CommandModel {
    pub fn new(
        store: Arc<dyn EventStore + Send + Sync>,
        query: QueryModel,
        entities: Arc<EntityStore>,
    ) -> Self {
        Self {
            store,
            query,
            entities,
            version_counter: Mutex::new(0),
        }
    }

    /// Version of the most recently appended event
    pub fn current_version(&self) -> u64 {
        *self
            .version_counter
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Validate and execute a command, returning the rebuilt aggregate.
    ///
    /// A rejected command leaves the log and the version counter untouched.
    pub fn execute_command(&self, command: &Command) -> AppResult<Account> {
        let mut counter = self
            .version_counter
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if command.kind == CommandKind::Withdrawal {
            let account: Account = self.query.rebuild_aggregate(command.account_id)?;
            if !account.can_withdraw(&command.amount) {
                tracing::debug!(
                    "Rejected withdrawal of {} from account {}: balance {}",
                    command.amount,
                    command.account_id,
                    account.balance()
                );
                return Err(DomainError::insufficient_balance(
                    command.amount.value(),
                    account.balance().value(),
                )
                .into());
            }
        }

        *counter += 1;
        self.store.append(command.forward_event(*counter)?)?;

        let account = self.refresh(command.account_id)?;
        tracing::debug!(
            "Executed {:?} of {} on account {} at version {}",
            command.kind,
            command.amount,
            command.account_id,
            *counter
        );
        Ok(account)
    }

    /// Append the compensating event for a previously executed command.
    ///
    /// Undo is unconditional: no balance check is performed, so undoing a
    /// deposit may drive the balance negative.
    pub fn undo_command(&self, command: &Command) -> AppResult<Account> {
        let mut counter = self
            .version_counter
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        *counter += 1;
        self.store.append(command.inverse_event(*counter)?)?;

        let account = self.refresh(command.account_id)?;
        tracing::debug!(
            "Undid {:?} of {} on account {} at version {}",
            command.kind,
            command.amount,
            command.account_id,
            *counter
        );
        Ok(account)
    }

    /// Balance of an account as seen by the read model cache
    pub fn query_entity(&self, account_id: Uuid) -> Option<AccountEntity> {
        self.entities.query_entity(account_id)
    }

    fn refresh(&self, account_id: Uuid) -> AppResult<Account> {
        let account: Account = self.query.rebuild_aggregate(account_id)?;
        self.query.snapshot_if_due(&account)?;
        self.entities.update_entity(AccountEntity::from_account(&account));
        Ok(account)
    }
}
