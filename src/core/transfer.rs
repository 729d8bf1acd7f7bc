//! Two-party transfers
//!
//! A transfer is a pair of linked records: a debit on the sender and a credit
//! on the receiver, sharing amount magnitude, timestamp and counterparty
//! links. Both legs go to the store as one unit of work, so readers observe
//! both or neither.
//!
//! # Concurrency
//!
//! The coordinator enters both users' sections through
//! [`UserLocks::lock_pair`], which orders acquisition by user id. The
//! sender's balance check, the receiver's headroom check and the commit happen
//! inside those sections.

use crate::core::balance::BalanceCalculator;
use crate::core::clock::Clock;
use crate::core::locks::UserLocks;
use crate::core::traits::UnitOfWork;
use crate::core::validation::{require_distinct, require_positive};
use crate::types::{
    LedgerError, NewTransaction, Party, TransferLink, TransferReceipt, UserId,
};
use rust_decimal::Decimal;
use std::sync::Arc;

/// Moves credit between users atomically
#[derive(Clone)]
pub struct TransferCoordinator {
    calculator: BalanceCalculator,
    locks: Arc<UserLocks>,
    clock: Arc<dyn Clock>,
}

impl TransferCoordinator {
    pub fn new(calculator: BalanceCalculator, locks: Arc<UserLocks>, clock: Arc<dyn Clock>) -> Self {
        Self {
            calculator,
            locks,
            clock,
        }
    }

    /// Move `amount` from `sender` to `receiver`
    ///
    /// Checks run in this order, and the first failure is returned:
    /// amount positive, distinct users, sender exists, receiver exists,
    /// sender balance covers `amount`.
    ///
    /// # Errors
    ///
    /// * `Validation(NonPositiveAmount)` - `amount <= 0`
    /// * `Validation(SelfTransfer)` - sender and receiver are the same user
    /// * `UserNotFound` with [`Party::Sender`] or [`Party::Receiver`]
    /// * `InsufficientBalance` - the sender's balance is below `amount`
    /// * `BalanceOverflow` - the receiver's balance would not be representable
    /// * `Storage` - the unit was rolled back; neither leg is visible
    pub fn transfer(
        &self,
        sender: UserId,
        receiver: UserId,
        amount: Decimal,
    ) -> Result<TransferReceipt, LedgerError> {
        let amount = require_positive(amount)?;
        require_distinct(sender, receiver)?;
        self.calculator.require_user(sender, Party::Sender)?;
        self.calculator.require_user(receiver, Party::Receiver)?;

        let _sections = self.locks.lock_pair(sender, receiver);

        let balance = self.calculator.balance_unchecked(sender)?;
        if balance < amount {
            tracing::warn!(sender, receiver, %balance, requested = %amount, "transfer rejected");
            return Err(LedgerError::insufficient_balance(sender, balance, amount));
        }
        self.calculator
            .balance_after_credit(receiver, amount)
            .inspect_err(|e| {
                tracing::warn!(sender, receiver, %amount, error = %e, "transfer rejected")
            })?;

        let link = TransferLink { sender, receiver };
        let unit: UnitOfWork = NewTransaction::transfer_legs(link, amount, self.clock.now())
            .into_iter()
            .collect();

        let mut committed = self
            .calculator
            .store()
            .commit(unit)
            .inspect_err(|e| {
                tracing::error!(sender, receiver, %amount, error = %e, "transfer rolled back")
            })?
            .into_iter();

        let (Some(debit), Some(credit)) = (committed.next(), committed.next()) else {
            return Err(LedgerError::storage("store returned fewer than two transfer legs"));
        };

        tracing::info!(
            sender,
            receiver,
            %amount,
            debit_tx = debit.id,
            credit_tx = credit.id,
            "transfer committed"
        );
        Ok(TransferReceipt { debit, credit })
    }
}
