//! Transaction-related types for the credit ledger
//!
//! A [`Transaction`] is the only fact the ledger persists. Operations build
//! [`NewTransaction`] values, the store stamps them with an id and returns the
//! committed record.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// User identifier
///
/// Opaque to the ledger; issued by the user directory.
pub type UserId = u32;

/// Transaction identifier
///
/// Assigned by the store on commit, strictly increasing.
pub type TransactionId = u64;

/// Counterparty links carried by both legs of a transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferLink {
    /// User whose balance is debited
    pub sender: UserId,
    /// User whose balance is credited
    pub receiver: UserId,
}

/// A committed, immutable ledger record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Store-assigned identifier
    pub id: TransactionId,

    /// User whose balance this record affects
    pub user: UserId,

    /// Signed amount: positive credits the owner, negative debits it
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,

    /// Creation instant (UTC)
    pub timestamp: DateTime<Utc>,

    /// Sender of the transfer that produced this leg
    ///
    /// `None` for unilateral credits and debits.
    pub sender: Option<UserId>,

    /// Receiver of the transfer that produced this leg
    pub receiver: Option<UserId>,
}

impl Transaction {
    /// Counterparty links, if this record is a transfer leg
    pub fn link(&self) -> Option<TransferLink> {
        match (self.sender, self.receiver) {
            (Some(sender), Some(receiver)) => Some(TransferLink { sender, receiver }),
            _ => None,
        }
    }

    /// True if this record is a credit to its owner
    pub fn is_credit(&self) -> bool {
        self.amount.is_sign_positive() && !self.amount.is_zero()
    }
}

/// A record staged for commit, not yet assigned an id
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub user: UserId,
    pub amount: Decimal,
    pub timestamp: DateTime<Utc>,
    pub sender: Option<UserId>,
    pub receiver: Option<UserId>,
}

impl From<&Transaction> for NewTransaction {
    fn from(record: &Transaction) -> Self {
        Self {
            user: record.user,
            amount: record.amount,
            timestamp: record.timestamp,
            sender: record.sender,
            receiver: record.receiver,
        }
    }
}

impl NewTransaction {
    /// Unilateral credit (`+amount`) for `user`
    pub fn credit(user: UserId, amount: Decimal, timestamp: DateTime<Utc>) -> Self {
        Self {
            user,
            amount,
            timestamp,
            sender: None,
            receiver: None,
        }
    }

    /// Unilateral debit (`-amount`) for `user`
    pub fn debit(user: UserId, amount: Decimal, timestamp: DateTime<Utc>) -> Self {
        Self {
            user,
            amount: -amount,
            timestamp,
            sender: None,
            receiver: None,
        }
    }

    /// Both legs of a transfer, debit first
    pub fn transfer_legs(
        link: TransferLink,
        amount: Decimal,
        timestamp: DateTime<Utc>,
    ) -> [Self; 2] {
        let leg = |user, amount| Self {
            user,
            amount,
            timestamp,
            sender: Some(link.sender),
            receiver: Some(link.receiver),
        };
        [leg(link.sender, -amount), leg(link.receiver, amount)]
    }

    /// Attach an id, producing the committed record
    pub fn into_committed(self, id: TransactionId) -> Transaction {
        Transaction {
            id,
            user: self.user,
            amount: self.amount,
            timestamp: self.timestamp,
            sender: self.sender,
            receiver: self.receiver,
        }
    }
}

/// The two committed legs of a transfer
#[derive(Debug, Clone, PartialEq)]
pub struct TransferReceipt {
    /// Sender-side leg (negative amount)
    pub debit: Transaction,
    /// Receiver-side leg (positive amount)
    pub credit: Transaction,
}
