//! Balance derivation
//!
//! Balances are never stored. They are recomputed from the owner's records on
//! every query, so the transaction log stays the single source of truth.

use crate::core::traits::{TransactionStore, UserDirectory};
use crate::types::{LedgerError, Party, Transaction, UserBalance, UserId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;

/// Sum of all amounts, or `None` if the total leaves the `Decimal` range
pub fn sum_amounts(records: &[Transaction]) -> Option<Decimal> {
    checked_sum(records.iter())
}

/// Sum of amounts stamped strictly before `instant`
///
/// A record stamped exactly at `instant` is excluded.
pub fn sum_before(records: &[Transaction], instant: DateTime<Utc>) -> Option<Decimal> {
    checked_sum(records.iter().filter(|record| record.timestamp < instant))
}

fn checked_sum<'a>(mut records: impl Iterator<Item = &'a Transaction>) -> Option<Decimal> {
    records.try_fold(Decimal::ZERO, |total, record| total.checked_add(record.amount))
}

/// Read-only balance queries over a transaction store
#[derive(Clone)]
pub struct BalanceCalculator {
    store: Arc<dyn TransactionStore>,
    directory: Arc<dyn UserDirectory>,
}

impl BalanceCalculator {
    pub fn new(store: Arc<dyn TransactionStore>, directory: Arc<dyn UserDirectory>) -> Self {
        Self { store, directory }
    }

    /// Current balance of `user`
    ///
    /// # Errors
    ///
    /// * `UserNotFound` - no such user
    /// * `BalanceOverflow` - the records do not sum to a representable value
    /// * `Storage` - the store could not be read
    pub fn balance(&self, user: UserId) -> Result<Decimal, LedgerError> {
        self.require_user(user, Party::Account)?;
        self.balance_unchecked(user)
    }

    /// Balance of `user` counting only records stamped strictly before `instant`
    pub fn balance_as_of(
        &self,
        user: UserId,
        instant: DateTime<Utc>,
    ) -> Result<Decimal, LedgerError> {
        self.require_user(user, Party::Account)?;
        let records = self.store.list_for_user(user)?;
        sum_before(&records, instant).ok_or(LedgerError::BalanceOverflow { user })
    }

    /// Balances of every known user, sorted by id
    pub fn all_balances(&self) -> Result<Vec<UserBalance>, LedgerError> {
        self.directory
            .list()
            .into_iter()
            .map(|user| {
                Ok(UserBalance {
                    balance: self.balance_unchecked(user.id)?,
                    user_id: user.id,
                    user_name: user.name,
                })
            })
            .collect()
    }

    /// Current balance without the existence check
    ///
    /// For callers that have already resolved the user.
    pub(crate) fn balance_unchecked(&self, user: UserId) -> Result<Decimal, LedgerError> {
        let records = self.store.list_for_user(user)?;
        sum_amounts(&records).ok_or(LedgerError::BalanceOverflow { user })
    }

    /// Balance `user` would have after crediting `amount`
    ///
    /// Caller holds the user's section so the result stays valid until commit.
    pub(crate) fn balance_after_credit(
        &self,
        user: UserId,
        amount: Decimal,
    ) -> Result<Decimal, LedgerError> {
        self.balance_unchecked(user)?
            .checked_add(amount)
            .ok_or(LedgerError::BalanceOverflow { user })
    }

    pub(crate) fn require_user(&self, user: UserId, party: Party) -> Result<(), LedgerError> {
        if self.directory.contains(user) {
            Ok(())
        } else {
            Err(LedgerError::user_not_found(user, party))
        }
    }

    pub(crate) fn directory(&self) -> &Arc<dyn UserDirectory> {
        &self.directory
    }

    pub(crate) fn store(&self) -> &Arc<dyn TransactionStore> {
        &self.store
    }
}
