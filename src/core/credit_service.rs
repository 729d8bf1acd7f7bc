//! Single-leg mutations: credit grants and withdrawals
//!
//! Both operations enter the user's exclusive section, read the balance, and
//! commit before leaving. A withdrawal checks that the balance covers the
//! debit; a grant checks that the balance stays representable after the
//! credit. Concurrent mutations of one user are therefore checked one after
//! another.

use crate::core::balance::BalanceCalculator;
use crate::core::clock::Clock;
use crate::core::locks::UserLocks;
use crate::core::validation::require_positive;
use crate::types::{LedgerError, NewTransaction, Party, Transaction, UserId};
use rust_decimal::Decimal;
use std::sync::Arc;

/// Grants and withdrawals against one store
#[derive(Clone)]
pub struct CreditService {
    calculator: BalanceCalculator,
    locks: Arc<UserLocks>,
    clock: Arc<dyn Clock>,
}

impl CreditService {
    pub fn new(calculator: BalanceCalculator, locks: Arc<UserLocks>, clock: Arc<dyn Clock>) -> Self {
        Self {
            calculator,
            locks,
            clock,
        }
    }

    /// Credit `amount` to `user`
    ///
    /// # Errors
    ///
    /// * `Validation(NonPositiveAmount)` - `amount <= 0`
    /// * `UserNotFound` - no such user
    /// * `BalanceOverflow` - the new balance would not be representable;
    ///   nothing is written
    /// * `Storage` - the record could not be committed
    pub fn grant_credit(&self, user: UserId, amount: Decimal) -> Result<Transaction, LedgerError> {
        let amount = require_positive(amount)?;
        self.calculator.require_user(user, Party::Account)?;

        let _section = self.locks.lock(user);
        self.calculator
            .balance_after_credit(user, amount)
            .inspect_err(|e| tracing::warn!(user, %amount, error = %e, "credit grant rejected"))?;

        let record = self
            .calculator
            .store()
            .append(NewTransaction::credit(user, amount, self.clock.now()))
            .inspect_err(|e| tracing::error!(user, %amount, error = %e, "credit grant failed"))?;

        tracing::info!(user, %amount, tx = record.id, "credit granted");
        Ok(record)
    }

    /// Debit `amount` from `user` if the balance covers it
    ///
    /// A withdrawal equal to the balance succeeds and leaves zero.
    ///
    /// # Errors
    ///
    /// * `Validation(NonPositiveAmount)` - `amount <= 0`
    /// * `UserNotFound` - no such user
    /// * `InsufficientBalance` - `balance < amount`; nothing is written
    /// * `Storage` - the record could not be committed
    pub fn withdraw(&self, user: UserId, amount: Decimal) -> Result<Transaction, LedgerError> {
        let amount = require_positive(amount)?;
        self.calculator.require_user(user, Party::Account)?;

        let _section = self.locks.lock(user);
        let balance = self.calculator.balance_unchecked(user)?;
        if balance < amount {
            tracing::warn!(user, %balance, requested = %amount, "withdrawal rejected");
            return Err(LedgerError::insufficient_balance(user, balance, amount));
        }

        let record = self
            .calculator
            .store()
            .append(NewTransaction::debit(user, amount, self.clock.now()))
            .inspect_err(|e| tracing::error!(user, %amount, error = %e, "withdrawal rolled back"))?;

        tracing::info!(user, %amount, tx = record.id, "credit withdrawn");
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::ManualClock;
    use crate::core::traits::TransactionStore;
    use crate::core::transaction_store::InMemoryTransactionStore;
    use crate::core::user_directory::InMemoryUserDirectory;
    use crate::types::{User, ValidationError};
    use chrono::{TimeZone, Utc};
    use rstest::rstest;

    fn setup() -> (CreditService, Arc<InMemoryTransactionStore>) {
        let store = Arc::new(InMemoryTransactionStore::new());
        let directory = Arc::new(InMemoryUserDirectory::new());
        directory.insert(User::new(1, "ann")).unwrap();
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        ));
        let service = CreditService::new(
            BalanceCalculator::new(store.clone(), directory),
            Arc::new(UserLocks::new()),
            clock,
        );
        (service, store)
    }

    #[test]
    fn test_grant_credit_appends_positive_unlinked_record() {
        let (service, store) = setup();

        let record = service.grant_credit(1, Decimal::from(100)).unwrap();

        assert_eq!(record.user, 1);
        assert_eq!(record.amount, Decimal::from(100));
        assert!(record.link().is_none());
        assert_eq!(store.list_for_user(1).unwrap(), vec![record]);
    }

    #[rstest]
    #[case::zero(Decimal::ZERO)]
    #[case::negative(Decimal::from(-10))]
    fn test_non_positive_amounts_rejected_without_writes(#[case] amount: Decimal) {
        let (service, store) = setup();

        assert_eq!(
            service.grant_credit(1, amount),
            Err(LedgerError::Validation(ValidationError::NonPositiveAmount {
                amount
            }))
        );
        assert!(matches!(
            service.withdraw(1, amount),
            Err(LedgerError::Validation(_))
        ));
        assert!(store.list_all().unwrap().is_empty());
    }

    #[test]
    fn test_unknown_user_rejected() {
        let (service, store) = setup();

        assert_eq!(
            service.grant_credit(2, Decimal::ONE),
            Err(LedgerError::user_not_found(2, Party::Account))
        );
        assert_eq!(
            service.withdraw(2, Decimal::ONE),
            Err(LedgerError::user_not_found(2, Party::Account))
        );
        assert!(store.list_all().unwrap().is_empty());
    }

    #[test]
    fn test_grant_at_range_limit_then_overflowing_grant_rejected() {
        let (service, store) = setup();

        service.grant_credit(1, Decimal::MAX).unwrap();
        assert_eq!(
            service.grant_credit(1, Decimal::MAX),
            Err(LedgerError::BalanceOverflow { user: 1 })
        );
        assert_eq!(
            service.grant_credit(1, Decimal::new(1, 4)),
            Err(LedgerError::BalanceOverflow { user: 1 })
        );
        assert_eq!(store.list_for_user(1).unwrap().len(), 1);

        // The account stays readable and debitable
        let record = service.withdraw(1, Decimal::ONE).unwrap();
        assert_eq!(record.amount, -Decimal::ONE);
        service.grant_credit(1, Decimal::ONE).unwrap();
    }

    #[test]
    fn test_excess_precision_rejected_without_writes() {
        let (service, store) = setup();

        assert!(matches!(
            service.grant_credit(1, Decimal::new(1, 5)),
            Err(LedgerError::Validation(ValidationError::ExcessPrecision { .. }))
        ));
        assert!(store.list_all().unwrap().is_empty());
    }

    #[test]
    fn test_withdraw_debits_balance() {
        let (service, store) = setup();
        service.grant_credit(1, Decimal::from(100)).unwrap();

        let record = service.withdraw(1, Decimal::from(30)).unwrap();

        assert_eq!(record.amount, Decimal::from(-30));
        assert!(record.link().is_none());
        assert_eq!(store.list_for_user(1).unwrap().len(), 2);
    }

    #[test]
    fn test_withdraw_entire_balance_leaves_zero() {
        let (service, store) = setup();
        service.grant_credit(1, Decimal::from(60)).unwrap();

        service.withdraw(1, Decimal::from(60)).unwrap();

        let total: Decimal = store
            .list_for_user(1)
            .unwrap()
            .iter()
            .map(|t| t.amount)
            .sum();
        assert_eq!(total, Decimal::ZERO);
    }

    #[test]
    fn test_withdraw_more_than_balance_fails() {
        let (service, store) = setup();
        service.grant_credit(1, Decimal::from(60)).unwrap();

        let result = service.withdraw(1, Decimal::from(200));

        assert_eq!(
            result,
            Err(LedgerError::InsufficientBalance {
                user: 1,
                balance: Decimal::from(60),
                requested: Decimal::from(200),
            })
        );
        assert_eq!(store.list_for_user(1).unwrap().len(), 1);
    }
}
