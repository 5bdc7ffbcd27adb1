//! Entity Store
//!
//! Denormalized read models refreshed from events.
//! This is the "Q" side of CQRS - entities optimized for queries.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use uuid::Uuid;

use crate::aggregate::{Account, Aggregate};

/// Read model for a single account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountEntity {
    pub account_id: Uuid,
    pub balance: Decimal,
    pub version: u64,
    pub updated_at: DateTime<Utc>,
}

impl AccountEntity {
    /// Build a read model from rebuilt aggregate state
    pub fn from_account(account: &Account) -> Self {
        Self {
            account_id: account.id(),
            balance: account.balance().value(),
            version: account.version(),
            updated_at: Utc::now(),
        }
    }
}

/// In-memory read cache keyed by account id
#[derive(Debug, Default)]
pub struct EntityStore {
    entities: RwLock<HashMap<Uuid, AccountEntity>>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refresh the cached read model for an account
    pub fn update_entity(&self, entity: AccountEntity) {
        tracing::debug!(
            "Read model refreshed for account {} at version {}",
            entity.account_id,
            entity.version
        );

        let mut entities = self
            .entities
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        entities.insert(entity.account_id, entity);
    }

    /// Get the cached read model for an account, if one has been projected
    pub fn query_entity(&self, account_id: Uuid) -> Option<AccountEntity> {
        let entities = self
            .entities
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        entities.get(&account_id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AccountEvent;

    #[test]
    fn test_query_unknown_account_is_none() {
        let store = EntityStore::new();
        assert!(store.query_entity(Uuid::new_v4()).is_none());
    }

    #[test]
    fn test_update_then_query() {
        let store = EntityStore::new();
        let account_id = Uuid::new_v4();

        let account = Account::with_id(account_id).apply(
            AccountEvent::deposited(account_id, Decimal::new(100, 0)),
            1,
        );
        store.update_entity(AccountEntity::from_account(&account));

        let entity = store.query_entity(account_id).unwrap();
        assert_eq!(entity.balance, Decimal::new(100, 0));
        assert_eq!(entity.version, 1);
    }

    #[test]
    fn test_update_replaces_previous_projection() {
        let store = EntityStore::new();
        let account_id = Uuid::new_v4();

        let account = Account::with_id(account_id).apply(
            AccountEvent::deposited(account_id, Decimal::new(100, 0)),
            1,
        );
        store.update_entity(AccountEntity::from_account(&account));

        let account = account.apply(AccountEvent::withdrawn(account_id, Decimal::new(40, 0)), 2);
        store.update_entity(AccountEntity::from_account(&account));

        let entity = store.query_entity(account_id).unwrap();
        assert_eq!(entity.balance, Decimal::new(60, 0));
        assert_eq!(entity.version, 2);
    }
}
