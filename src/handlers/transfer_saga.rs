//! Transfer Saga
//!
//! Moves money between two accounts as two independent commands. There is
//! no cross-account transaction; atomicity comes from compensation. If any
//! step fails, every completed step is undone in reverse order and the
//! original failure is returned to the caller.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{Amount, DomainError};
use crate::error::AppResult;

use super::{Command, CommandModel};

/// Lifecycle of a single transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SagaState {
    Pending,
    Compensating,
    Committed,
    Failed,
}

/// Two-step transfer with reverse-order compensation
pub struct TransferSaga {
    command_model: Arc<CommandModel>,
    successful_commands: Vec<Command>,
    state: SagaState,
}

impl TransferSaga {
    pub fn new(command_model: Arc<CommandModel>) -> Self {
        Self {
            command_model,
            successful_commands: Vec::new(),
            state: SagaState::Pending,
        }
    }

    pub fn state(&self) -> SagaState {
        self.state
    }

    /// Withdraw `amount` from `from` and deposit it into `to`.
    ///
    /// On failure the completed steps are compensated and the error of the
    /// failing step is returned unchanged.
    pub fn start_transfer(
        &mut self,
        from: Uuid,
        to: Uuid,
        amount: Amount,
    ) -> AppResult<()> {
        if from == to {
            return Err(DomainError::SameAccountTransfer.into());
        }

        // Each call is a fresh transfer attempt.
        self.successful_commands.clear();
        self.state = SagaState::Pending;

        tracing::info!("Starting transfer of {} from {} to {}", amount, from, to);

        let withdraw = Command::withdrawal(from, amount.clone());
        if let Err(e) = self.command_model.execute_command(&withdraw) {
            self.compensate();
            self.state = SagaState::Failed;
            return Err(e);
        }
        self.successful_commands.push(withdraw);

        let deposit = Command::deposit(to, amount);
        if let Err(e) = self.command_model.execute_command(&deposit) {
            self.compensate();
            self.state = SagaState::Failed;
            return Err(e);
        }
        self.successful_commands.push(deposit);

        self.state = SagaState::Committed;
        tracing::info!("Transfer from {} to {} committed", from, to);
        Ok(())
    }

    /// Undo every completed step in reverse order.
    ///
    /// An undo failure is logged and compensation continues with the
    /// remaining steps; the caller still receives the original step error.
    fn compensate(&mut self) {
        self.state = SagaState::Compensating;
        tracing::warn!(
            "Transfer step failed, compensating {} completed step(s)",
            self.successful_commands.len()
        );

        for command in self.successful_commands.iter().rev() {
            if let Err(e) = self.command_model.undo_command(command) {
                tracing::error!(
                    "Failed to undo {:?} of {} on account {}: {}",
                    command.kind,
                    command.amount,
                    command.account_id,
                    e
                );
            }
        }

        self.successful_commands.clear();
    }
}
