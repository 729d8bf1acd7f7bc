//! Core business logic module
//!
//! This module contains the ledger components:
//! - `traits` - Store and directory abstractions, units of work
//! - `transaction_store` - In-memory append-only store
//! - `journal_store` - Durable JSON-lines store
//! - `user_directory` - In-memory user table
//! - `balance` - Derived balances
//! - `credit_service` - Grants and withdrawals
//! - `transfer` - Two-legged atomic transfers
//! - `locks` - Per-user exclusive sections
//! - `ledger` - The facade collaborators call
//! - `command_runner` - Applies replayed commands
//! - `batch_processor` - Concurrent batch execution by user overlap

pub mod balance;
pub mod batch_processor;
pub mod clock;
pub mod command_runner;
pub mod credit_service;
pub mod journal_store;
pub mod ledger;
pub mod locks;
pub mod traits;
pub mod transaction_store;
pub mod transfer;
pub mod user_directory;
pub mod validation;

pub use balance::BalanceCalculator;
pub use batch_processor::{BatchProcessor, ProcessingResult};
pub use clock::{Clock, ManualClock, SystemClock};
pub use command_runner::CommandRunner;
pub use credit_service::CreditService;
pub use journal_store::JournalStore;
pub use ledger::Ledger;
pub use locks::UserLocks;
pub use traits::{TransactionStore, UnitOfWork, UserDirectory};
pub use transaction_store::InMemoryTransactionStore;
pub use transfer::TransferCoordinator;
pub use user_directory::InMemoryUserDirectory;
