//! Credit Ledger Library
//! # Overview
//!
//! An append-only credit ledger. Every balance change is an immutable
//! transaction record; balances are derived by summing a user's records, either
//! in full or up to a point in time.
//!
//! # Architecture
//!
//! - [`types`] - Core data types (Transaction, User, errors, commands)
//! - [`core`] - Ledger components:
//!   - [`core::traits`] - `TransactionStore` and `UserDirectory` abstractions
//!   - [`core::transaction_store`] / [`core::journal_store`] - In-memory and
//!     durable stores
//!   - [`core::balance`] - Derived balances
//!   - [`core::credit_service`] - Grants and withdrawals
//!   - [`core::transfer`] - Atomic two-legged transfers
//!   - [`core::ledger`] - The facade collaborators call
//! - [`io`] - Command CSV parsing and balance reports
//! - [`strategy`] - Sync and async replay pipelines
//! - [`cli`] - CLI arguments and log setup
//!
//! # Operations
//!
//! - **Grant**: Credit funds to a user
//! - **Withdraw**: Debit funds from a user (requires sufficient balance)
//! - **Transfer**: Debit the sender and credit the receiver as one atomic unit
//! - **Balance**: Current or point-in-time sum of a user's records
//!
//! ```
//! use credit_ledger::{InMemoryTransactionStore, InMemoryUserDirectory, Ledger, User};
//! use rust_decimal::Decimal;
//! use std::sync::Arc;
//!
//! let directory = Arc::new(InMemoryUserDirectory::new());
//! directory.insert(User::new(1, "ann")).unwrap();
//! directory.insert(User::new(2, "bob")).unwrap();
//! let ledger = Ledger::new(Arc::new(InMemoryTransactionStore::new()), directory);
//!
//! ledger.grant_credit(1, Decimal::from(100)).unwrap();
//! ledger.transfer(1, 2, Decimal::from(40)).unwrap();
//! assert_eq!(ledger.get_balance(1).unwrap().balance, Decimal::from(60));
//! ```

pub mod cli;
pub mod core;
pub mod io;
pub mod strategy;
pub mod types;

pub use core::{
    BalanceCalculator, CreditService, InMemoryTransactionStore, InMemoryUserDirectory,
    JournalStore, Ledger, TransactionStore, TransferCoordinator, UnitOfWork, UserDirectory,
};
pub use io::write_balances_csv;
pub use types::{
    LedgerCommand, LedgerError, Party, Transaction, TransactionId, TransferReceipt, User,
    UserBalance, UserId, ValidationError,
};
