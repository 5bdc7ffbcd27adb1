//! Aggregate module
//!
//! Aggregate Root pattern implementation for Event Sourcing.

pub mod account;

pub use account::Account;

/// Aggregate trait that all aggregates must implement
pub trait Aggregate: Sized {
    /// The type of events this aggregate handles
    type Event;

    /// Get the aggregate type name (for storage)
    fn aggregate_type() -> &'static str;

    /// Baseline state for an aggregate with no recorded history
    fn with_id(id: uuid::Uuid) -> Self;

    /// Get the aggregate ID
    fn id(&self) -> uuid::Uuid;

    /// Get the version of the last event applied
    fn version(&self) -> u64;

    /// Apply an event recorded at `version` to update the aggregate state.
    ///
    /// Versions come from a counter shared across all aggregates, so the
    /// fold adopts the recorded version instead of incrementing its own.
    fn apply(self, event: Self::Event, version: u64) -> Self;
}
