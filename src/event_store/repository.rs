//! Event Store Repository
//!
//! Core implementation of the Event Store pattern: an append-only event log
//! with a snapshot side table. The `EventStore` trait is the seam a durable
//! backend would fill; `InMemoryEventStore` is the reference implementation.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use uuid::Uuid;

use super::EventStoreError;

/// Stored event record in the log
#[derive(Debug, Clone)]
pub struct StoredEvent {
    pub aggregate_id: Uuid,
    pub version: u64,
    pub event_type: String,
    pub event_data: serde_json::Value,
    pub recorded_at: DateTime<Utc>,
}

impl StoredEvent {
    /// Create a stored event record by serializing a domain event
    pub fn new<E: Serialize>(
        aggregate_id: Uuid,
        version: u64,
        event_type: &str,
        event: &E,
    ) -> Result<Self, EventStoreError> {
        let event_data = serde_json::to_value(event)?;
        Ok(Self {
            aggregate_id,
            version,
            event_type: event_type.to_string(),
            event_data,
            recorded_at: Utc::now(),
        })
    }
}

/// Snapshot of aggregate state at a given version
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub version: u64,
    pub state: serde_json::Value,
    pub taken_at: DateTime<Utc>,
}

impl Snapshot {
    /// Create a snapshot record by serializing aggregate state
    pub fn new<S: Serialize>(version: u64, state: &S) -> Result<Self, EventStoreError> {
        let state = serde_json::to_value(state)?;
        Ok(Self {
            version,
            state,
            taken_at: Utc::now(),
        })
    }
}

/// Event Store for persisting and retrieving events
pub trait EventStore {
    /// Append an event to the log
    fn append(&self, event: StoredEvent) -> Result<(), EventStoreError>;

    /// Get all events for an aggregate, ordered by version
    fn events_for(&self, aggregate_id: Uuid) -> Result<Vec<StoredEvent>, EventStoreError>;

    /// Get events for an aggregate with version strictly greater than `after`
    fn events_after(
        &self,
        aggregate_id: Uuid,
        after: u64,
    ) -> Result<Vec<StoredEvent>, EventStoreError>;

    /// Save or replace the snapshot for an aggregate
    fn save_snapshot(&self, aggregate_id: Uuid, snapshot: Snapshot)
        -> Result<(), EventStoreError>;

    /// Load the latest snapshot for an aggregate, if any
    fn load_snapshot(&self, aggregate_id: Uuid) -> Result<Option<Snapshot>, EventStoreError>;
}

/// In-memory event store backed by an append-only vec and a snapshot map
#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    events: RwLock<Vec<StoredEvent>>,
    snapshots: RwLock<HashMap<Uuid, Snapshot>>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of events in the log, across all aggregates
    pub fn event_count(&self) -> usize {
        self.events
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl EventStore for InMemoryEventStore {
    fn append(&self, event: StoredEvent) -> Result<(), EventStoreError> {
        let mut events = self.events.write().unwrap_or_else(PoisonError::into_inner);
        events.push(event);
        Ok(())
    }

    fn events_for(&self, aggregate_id: Uuid) -> Result<Vec<StoredEvent>, EventStoreError> {
        self.events_after(aggregate_id, 0)
    }

    fn events_after(
        &self,
        aggregate_id: Uuid,
        after: u64,
    ) -> Result<Vec<StoredEvent>, EventStoreError> {
        let events = self.events.read().unwrap_or_else(PoisonError::into_inner);
        // Appended in version order, so the filtered view is already sorted.
        Ok(events
            .iter()
            .filter(|e| e.aggregate_id == aggregate_id && e.version > after)
            .cloned()
            .collect())
    }

    fn save_snapshot(
        &self,
        aggregate_id: Uuid,
        snapshot: Snapshot,
    ) -> Result<(), EventStoreError> {
        let mut snapshots = self
            .snapshots
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        snapshots.insert(aggregate_id, snapshot);
        Ok(())
    }

    fn load_snapshot(&self, aggregate_id: Uuid) -> Result<Option<Snapshot>, EventStoreError> {
        let snapshots = self
            .snapshots
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        Ok(snapshots.get(&aggregate_id).cloned())
    }
}
