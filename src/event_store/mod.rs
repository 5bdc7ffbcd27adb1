//! Event Store module
//!
//! Persistence layer for Event Sourcing.
//! Handles storing and retrieving events from the append-only log.

mod error;
mod repository;

pub use error::EventStoreError;
pub use repository::{EventStore, InMemoryEventStore, Snapshot, StoredEvent};
