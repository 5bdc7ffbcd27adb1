//! Projection module
//!
//! Updates read models (projections) from events.
//! Projections are optimized for queries and derived from events.

mod entity_store;

pub use entity_store::{AccountEntity, EntityStore};
