//! Command Handlers module
//!
//! CQRS write-side handlers that orchestrate business operations.
//! The command model coordinates aggregates, event store, and projections;
//! the transfer saga composes commands with compensation.

mod command_model;
mod commands;
mod transfer_saga;

#[cfg(test)]
mod tests;

pub use command_model::CommandModel;
pub use commands::{Command, CommandKind};
pub use transfer_saga::{SagaState, TransferSaga};
