//! Core traits for transaction storage and user lookup
//!
//! The ledger services receive these as `Arc<dyn ...>` handles at
//! construction, so in-memory, journaled and test-double implementations are
//! interchangeable.

use crate::types::{LedgerError, NewTransaction, Transaction, User, UserId};

/// A group of records that commits or rolls back together
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnitOfWork {
    records: Vec<NewTransaction>,
}

impl UnitOfWork {
    /// Create an empty unit
    pub fn new() -> Self {
        Self::default()
    }

    /// Unit holding one record
    pub fn single(record: NewTransaction) -> Self {
        Self {
            records: vec![record],
        }
    }

    /// Stage another record
    pub fn push(&mut self, record: NewTransaction) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[NewTransaction] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<NewTransaction> {
        self.records
    }
}

impl FromIterator<NewTransaction> for UnitOfWork {
    fn from_iter<I: IntoIterator<Item = NewTransaction>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

/// Append-only store of transaction records
///
/// Records are never updated or removed. Implementations must make
/// [`commit`](TransactionStore::commit) all-or-nothing: when it returns an
/// error, none of the unit's records are visible to any reader.
pub trait TransactionStore: Send + Sync {
    /// Commit every record of `unit`, assigning ids in staging order
    ///
    /// Returns the committed records in the same order.
    fn commit(&self, unit: UnitOfWork) -> Result<Vec<Transaction>, LedgerError>;

    /// Commit a single record
    fn append(&self, record: NewTransaction) -> Result<Transaction, LedgerError> {
        self.commit(UnitOfWork::single(record))?
            .pop()
            .ok_or_else(|| LedgerError::storage("store returned no record for a single append"))
    }

    /// All records owned by `user`, in id order
    fn list_for_user(&self, user: UserId) -> Result<Vec<Transaction>, LedgerError>;

    /// Every committed record, in id order
    fn list_all(&self) -> Result<Vec<Transaction>, LedgerError>;
}

/// Read access to the identity subsystem's users
pub trait UserDirectory: Send + Sync {
    /// Look up a user by id
    fn get(&self, id: UserId) -> Option<User>;

    /// Check whether a user exists
    fn contains(&self, id: UserId) -> bool {
        self.get(id).is_some()
    }

    /// All users, sorted by id
    fn list(&self) -> Vec<User>;
}
