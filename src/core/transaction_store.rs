//! In-memory transaction store
//!
//! This module provides the non-durable [`TransactionStore`] implementation and
//! the record constraints shared by every store.
//!
//! # Atomicity
//!
//! A unit is checked in full and id-stamped while holding the write lock, and
//! only then appended. Readers take the read lock, so they observe either none
//! or all of a unit's records.
//!
//! # Ordering
//!
//! Ids increase by one per record across all users. Per-user listings keep id
//! order, which is also creation order.

use crate::core::traits::{TransactionStore, UnitOfWork};
use crate::types::{LedgerError, NewTransaction, Transaction, TransactionId, UserId};
use parking_lot::RwLock;
use std::collections::HashMap;

/// Check the store-level constraints of one staged record
///
/// - the amount is non-zero
/// - counterparty links are both present or both absent
/// - a linked record belongs to its sender or its receiver, and the two differ
pub fn check_record(record: &NewTransaction) -> Result<(), LedgerError> {
    if record.amount.is_zero() {
        return Err(LedgerError::storage(format!(
            "constraint violation: zero amount for user {}",
            record.user
        )));
    }

    match (record.sender, record.receiver) {
        (None, None) => Ok(()),
        (Some(sender), Some(receiver)) => {
            if sender == receiver {
                return Err(LedgerError::storage(format!(
                    "constraint violation: transfer leg links user {} to itself",
                    sender
                )));
            }
            if record.user != sender && record.user != receiver {
                return Err(LedgerError::storage(format!(
                    "constraint violation: user {} is neither sender {} nor receiver {}",
                    record.user, sender, receiver
                )));
            }
            Ok(())
        }
        _ => Err(LedgerError::storage(format!(
            "constraint violation: partial counterparty link for user {}",
            record.user
        ))),
    }
}

/// Check a whole unit and stamp ids starting at `next_id`
///
/// Nothing is returned unless every record passes.
pub(crate) fn stamp_unit(
    unit: UnitOfWork,
    next_id: TransactionId,
) -> Result<Vec<Transaction>, LedgerError> {
    for record in unit.records() {
        check_record(record)?;
    }

    let mut id = next_id;
    let mut stamped = Vec::with_capacity(unit.len());
    for record in unit.into_records() {
        stamped.push(record.into_committed(id));
        id = id
            .checked_add(1)
            .ok_or_else(|| LedgerError::storage("transaction id space exhausted"))?;
    }
    Ok(stamped)
}

/// Append-only log with a per-user index
#[derive(Debug, Default)]
pub(crate) struct Log {
    records: Vec<Transaction>,
    by_user: HashMap<UserId, Vec<usize>>,
}

impl Log {
    pub(crate) fn next_id(&self) -> TransactionId {
        self.records.last().map_or(1, |last| last.id + 1)
    }

    pub(crate) fn extend(&mut self, committed: &[Transaction]) {
        for record in committed {
            self.by_user
                .entry(record.user)
                .or_default()
                .push(self.records.len());
            self.records.push(record.clone());
        }
    }

    pub(crate) fn for_user(&self, user: UserId) -> Vec<Transaction> {
        self.by_user
            .get(&user)
            .map(|positions| {
                positions
                    .iter()
                    .map(|&position| self.records[position].clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub(crate) fn all(&self) -> Vec<Transaction> {
        self.records.clone()
    }
}

/// Non-durable transaction store
///
/// Suitable for tests and for replays whose results need not survive the
/// process.
#[derive(Debug, Default)]
pub struct InMemoryTransactionStore {
    log: RwLock<Log>,
}

impl InMemoryTransactionStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl TransactionStore for InMemoryTransactionStore {
    fn commit(&self, unit: UnitOfWork) -> Result<Vec<Transaction>, LedgerError> {
        if unit.is_empty() {
            return Ok(Vec::new());
        }

        let mut log = self.log.write();
        let committed = stamp_unit(unit, log.next_id())?;
        log.extend(&committed);

        tracing::debug!(
            first_id = committed.first().map(|t| t.id),
            records = committed.len(),
            "committed unit"
        );
        Ok(committed)
    }

    fn list_for_user(&self, user: UserId) -> Result<Vec<Transaction>, LedgerError> {
        Ok(self.log.read().for_user(user))
    }

    fn list_all(&self) -> Result<Vec<Transaction>, LedgerError> {
        Ok(self.log.read().all())
    }
}
