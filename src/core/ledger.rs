//! Collaborator-facing ledger surface
//!
//! `Ledger` wires the balance calculator, credit service and transfer
//! coordinator around one store, one user directory, one lock table and one
//! clock. It is cheap to clone; clones share all of them.
//!
//! Mutual exclusion comes from the lock table, not the store. Ledgers built
//! separately over the same store must share one [`UserLocks`] through
//! [`Ledger::with_locks`], otherwise their debits are not serialized against
//! each other.
//!
//! The `*_text` entry points take identifiers and amounts as strings, the way
//! they arrive from request paths and form bodies, and reject malformed values
//! before anything else runs.

use crate::core::balance::BalanceCalculator;
use crate::core::clock::{Clock, SystemClock};
use crate::core::credit_service::CreditService;
use crate::core::locks::UserLocks;
use crate::core::traits::{TransactionStore, UserDirectory};
use crate::core::transfer::TransferCoordinator;
use crate::core::validation::{parse_amount, parse_instant, parse_user_id};
use crate::types::{
    LedgerError, Party, Transaction, TransferReceipt, UserBalance, UserId,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;

/// The credit ledger engine
#[derive(Clone)]
pub struct Ledger {
    calculator: BalanceCalculator,
    credits: CreditService,
    transfers: TransferCoordinator,
}

impl Ledger {
    /// Create a ledger stamping records with wall-clock time
    pub fn new(store: Arc<dyn TransactionStore>, directory: Arc<dyn UserDirectory>) -> Self {
        Self::with_clock(store, directory, Arc::new(SystemClock))
    }

    /// Create a ledger with an explicit time source and its own lock table
    pub fn with_clock(
        store: Arc<dyn TransactionStore>,
        directory: Arc<dyn UserDirectory>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::with_locks(store, directory, Arc::new(UserLocks::new()), clock)
    }

    /// Create a ledger over a lock table shared with other ledgers
    pub fn with_locks(
        store: Arc<dyn TransactionStore>,
        directory: Arc<dyn UserDirectory>,
        locks: Arc<UserLocks>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let calculator = BalanceCalculator::new(store, directory);
        Self {
            credits: CreditService::new(calculator.clone(), Arc::clone(&locks), Arc::clone(&clock)),
            transfers: TransferCoordinator::new(calculator.clone(), locks, clock),
            calculator,
        }
    }

    /// Current balance of `user`
    pub fn get_balance(&self, user: UserId) -> Result<UserBalance, LedgerError> {
        let name = self.user_name(user)?;
        Ok(UserBalance {
            user_id: user,
            user_name: name,
            balance: self.calculator.balance(user)?,
        })
    }

    /// Balance of `user` from records stamped strictly before `instant`
    pub fn get_balance_as_of(
        &self,
        user: UserId,
        instant: DateTime<Utc>,
    ) -> Result<UserBalance, LedgerError> {
        let name = self.user_name(user)?;
        Ok(UserBalance {
            user_id: user,
            user_name: name,
            balance: self.calculator.balance_as_of(user, instant)?,
        })
    }

    /// Balance of `user` at an RFC 3339 instant
    ///
    /// The instant is parsed before the user is looked up.
    pub fn get_balance_at(&self, user: UserId, instant: &str) -> Result<UserBalance, LedgerError> {
        let instant = parse_instant(instant)?;
        self.get_balance_as_of(user, instant)
    }

    pub fn grant_credit(&self, user: UserId, amount: Decimal) -> Result<Transaction, LedgerError> {
        self.credits.grant_credit(user, amount)
    }

    pub fn withdraw(&self, user: UserId, amount: Decimal) -> Result<Transaction, LedgerError> {
        self.credits.withdraw(user, amount)
    }

    pub fn transfer(
        &self,
        sender: UserId,
        receiver: UserId,
        amount: Decimal,
    ) -> Result<TransferReceipt, LedgerError> {
        self.transfers.transfer(sender, receiver, amount)
    }

    /// Balances of every user, sorted by id
    pub fn list_balances(&self) -> Result<Vec<UserBalance>, LedgerError> {
        self.calculator.all_balances()
    }

    /// Every committed record owned by `user`, in id order
    pub fn history(&self, user: UserId) -> Result<Vec<Transaction>, LedgerError> {
        self.calculator.require_user(user, Party::Account)?;
        self.calculator.store().list_for_user(user)
    }

    pub fn get_balance_text(&self, user: &str) -> Result<UserBalance, LedgerError> {
        self.get_balance(parse_user_id(user)?)
    }

    pub fn get_balance_at_text(&self, user: &str, instant: &str) -> Result<UserBalance, LedgerError> {
        self.get_balance_at(parse_user_id(user)?, instant)
    }

    pub fn grant_credit_text(&self, user: &str, amount: &str) -> Result<Transaction, LedgerError> {
        let user = parse_user_id(user)?;
        self.grant_credit(user, parse_amount(amount)?)
    }

    pub fn withdraw_text(&self, user: &str, amount: &str) -> Result<Transaction, LedgerError> {
        let user = parse_user_id(user)?;
        self.withdraw(user, parse_amount(amount)?)
    }

    pub fn transfer_text(
        &self,
        sender: &str,
        receiver: &str,
        amount: &str,
    ) -> Result<TransferReceipt, LedgerError> {
        let sender = parse_user_id(sender)?;
        let receiver = parse_user_id(receiver)?;
        self.transfer(sender, receiver, parse_amount(amount)?)
    }

    fn user_name(&self, user: UserId) -> Result<String, LedgerError> {
        self.calculator
            .directory()
            .get(user)
            .map(|found| found.name)
            .ok_or_else(|| LedgerError::user_not_found(user, Party::Account))
    }
}
