//! ledger_core Library
//!
//! Event-sourced account ledger core: an append-only event store with
//! snapshotting, a CQRS command/query split with a denormalized read cache,
//! and a compensating transfer saga.

pub mod aggregate;
pub mod config;
pub mod domain;
pub mod error;
pub mod event_store;
pub mod handlers;
pub mod projection;
pub mod query;

pub use config::Config;
pub use domain::{AccountEvent, Amount, AmountError, Balance, DomainError};
pub use error::{AppError, AppResult};
