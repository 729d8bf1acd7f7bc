//! Applies parsed ledger commands
//!
//! The runner owns the directory handle with write access, so `open` commands
//! can register users, and forwards every other command to the [`Ledger`].

use crate::core::ledger::Ledger;
use crate::core::traits::TransactionStore;
use crate::core::transaction_store::InMemoryTransactionStore;
use crate::core::user_directory::InMemoryUserDirectory;
use crate::types::{LedgerCommand, LedgerError, User, UserBalance};
use std::sync::Arc;

/// Command executor shared by the replay strategies
#[derive(Clone)]
pub struct CommandRunner {
    ledger: Ledger,
    directory: Arc<InMemoryUserDirectory>,
}

impl CommandRunner {
    /// Build a runner over `store` with an empty user directory
    pub fn new(store: Arc<dyn TransactionStore>) -> Self {
        let directory = Arc::new(InMemoryUserDirectory::new());
        Self {
            ledger: Ledger::new(store, directory.clone()),
            directory,
        }
    }

    /// Runner over a fresh in-memory store
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryTransactionStore::new()))
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Apply one command
    ///
    /// # Errors
    ///
    /// Whatever the underlying operation returns; nothing is written on error.
    pub fn apply(&self, command: &LedgerCommand) -> Result<(), LedgerError> {
        match command {
            LedgerCommand::Open { user, name } => {
                self.directory.insert(User::new(*user, name.as_str()))?;
            }
            LedgerCommand::Grant { user, amount } => {
                self.ledger.grant_credit(*user, *amount)?;
            }
            LedgerCommand::Withdraw { user, amount } => {
                self.ledger.withdraw(*user, *amount)?;
            }
            LedgerCommand::Transfer {
                sender,
                receiver,
                amount,
            } => {
                self.ledger.transfer(*sender, *receiver, *amount)?;
            }
        }
        Ok(())
    }

    /// Final balances of every user, sorted by id
    pub fn balances(&self) -> Result<Vec<UserBalance>, LedgerError> {
        self.ledger.list_balances()
    }
}
