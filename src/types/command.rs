//! Ledger commands
//!
//! One command per input CSV row. Commands carry already-parsed values; amount
//! positivity is checked by the ledger, not by the parser.

use super::transaction::UserId;
use rust_decimal::Decimal;

/// A single ledger operation to apply
#[derive(Debug, Clone, PartialEq)]
pub enum LedgerCommand {
    /// Register a user with an explicit id
    Open { user: UserId, name: String },

    /// Credit funds to a user
    Grant { user: UserId, amount: Decimal },

    /// Debit funds from a user (requires sufficient balance)
    Withdraw { user: UserId, amount: Decimal },

    /// Move funds from one user to another
    Transfer {
        sender: UserId,
        receiver: UserId,
        amount: Decimal,
    },
}

impl LedgerCommand {
    /// Every user this command reads or writes
    ///
    /// Used to group commands that must run in file order.
    pub fn users(&self) -> Vec<UserId> {
        match self {
            LedgerCommand::Open { user, .. }
            | LedgerCommand::Grant { user, .. }
            | LedgerCommand::Withdraw { user, .. } => vec![*user],
            LedgerCommand::Transfer {
                sender, receiver, ..
            } => vec![*sender, *receiver],
        }
    }

    /// Lowercase command name as it appears in CSV input
    pub fn kind(&self) -> &'static str {
        match self {
            LedgerCommand::Open { .. } => "open",
            LedgerCommand::Grant { .. } => "grant",
            LedgerCommand::Withdraw { .. } => "withdraw",
            LedgerCommand::Transfer { .. } => "transfer",
        }
    }
}
