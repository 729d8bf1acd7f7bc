//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `user`: Users and derived balances
//! - `transaction`: Transaction records and identifiers
//! - `command`: Ledger commands replayed from CSV input
//! - `error`: Error types for the ledger engine

pub mod command;
pub mod error;
pub mod transaction;
pub mod user;

pub use command::LedgerCommand;
pub use error::{LedgerError, Party, ValidationError};
pub use transaction::{
    NewTransaction, Transaction, TransactionId, TransferLink, TransferReceipt, UserId,
};
pub use user::{User, UserBalance};
