//! Query Model
//!
//! Read side of the CQRS split: rebuilds aggregate state by replaying
//! events from the store, with snapshot optimization so replay cost stays
//! bounded by the events recorded since the last checkpoint.

use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

use crate::aggregate::Aggregate;
use crate::event_store::{EventStore, EventStoreError, Snapshot};

/// Rebuilds aggregates from the event log
#[derive(Clone)]
pub struct QueryModel {
    store: Arc<dyn EventStore + Send + Sync>,
    snapshot_interval: u64,
}

impl QueryModel {
    /// Create a query model over an event store.
    ///
    /// `snapshot_interval` drives [`QueryModel::snapshot_if_due`]: a new
    /// snapshot is taken once an aggregate has advanced that many versions
    /// past its last checkpoint.
    pub fn new(store: Arc<dyn EventStore + Send + Sync>, snapshot_interval: u64) -> Self {
        Self {
            store,
            snapshot_interval,
        }
    }

    /// Rebuild an aggregate by replaying events (with snapshot optimization).
    ///
    /// An aggregate with no snapshot and no events rebuilds to its zero
    /// baseline; absence of history is a valid state, not an error.
    pub fn rebuild_aggregate<A>(&self, aggregate_id: Uuid) -> Result<A, EventStoreError>
    where
        A: Aggregate + DeserializeOwned,
        A::Event: DeserializeOwned,
    {
        // 1. Start from the snapshot if one exists
        let (from_version, mut aggregate) = match self.store.load_snapshot(aggregate_id)? {
            Some(snapshot) => {
                let state: A = serde_json::from_value(snapshot.state)?;
                (snapshot.version, state)
            }
            None => (0, A::with_id(aggregate_id)),
        };

        // 2. Replay events recorded after the snapshot version
        for stored in self.store.events_after(aggregate_id, from_version)? {
            let event: A::Event = serde_json::from_value(stored.event_data)?;
            aggregate = aggregate.apply(event, stored.version);
        }

        Ok(aggregate)
    }

    /// Save a snapshot of the aggregate's current state
    pub fn save_snapshot<A>(&self, aggregate: &A) -> Result<(), EventStoreError>
    where
        A: Aggregate + Serialize,
    {
        let snapshot = Snapshot::new(aggregate.version(), aggregate)?;
        self.store.save_snapshot(aggregate.id(), snapshot)?;

        tracing::info!(
            "Snapshot saved for {} aggregate {} at version {}",
            A::aggregate_type(),
            aggregate.id(),
            aggregate.version()
        );

        Ok(())
    }

    /// Save a snapshot if the aggregate has advanced far enough past its
    /// last checkpoint. Returns whether a snapshot was taken.
    pub fn snapshot_if_due<A>(&self, aggregate: &A) -> Result<bool, EventStoreError>
    where
        A: Aggregate + Serialize,
    {
        if self.snapshot_interval == 0 || aggregate.version() == 0 {
            return Ok(false);
        }

        let last_checkpoint = self
            .store
            .load_snapshot(aggregate.id())?
            .map(|s| s.version)
            .unwrap_or(0);

        if aggregate.version() - last_checkpoint < self.snapshot_interval {
            return Ok(false);
        }

        self.save_snapshot(aggregate)?;
        Ok(true)
    }
}
