//! Error types for the credit ledger
//!
//! Every engine operation returns a specifically-typed failure.
//!
//! # Error Categories
//!
//! - **Validation**: Rejected input, detected before any write
//! - **Lookup**: Unknown users, duplicate registrations
//! - **Sufficiency**: Debits larger than the current balance
//! - **Storage**: The persistence medium rejected or lost a write; the unit of
//!   work has already been rolled back when this surfaces

use super::transaction::UserId;
use rust_decimal::Decimal;
use std::fmt;
use thiserror::Error;

/// Which side of an operation a user plays
///
/// Carried by [`LedgerError::UserNotFound`] so callers can tell a missing
/// sender from a missing receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Party {
    /// Owner of a single-leg operation or balance query
    Account,
    /// Debited side of a transfer
    Sender,
    /// Credited side of a transfer
    Receiver,
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Party::Account => f.write_str("User"),
            Party::Sender => f.write_str("Sender"),
            Party::Receiver => f.write_str("Receiver"),
        }
    }
}

/// Input rejected before touching the store
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Amounts must be strictly positive; the operation assigns the sign
    #[error("Amount must be positive, got {amount}")]
    NonPositiveAmount { amount: Decimal },

    /// More fractional digits than the ledger keeps
    #[error("Amount {amount} has more than {max_scale} decimal places")]
    ExcessPrecision { amount: Decimal, max_scale: u32 },

    /// Amount text could not be parsed as a decimal
    #[error("Invalid amount '{value}'")]
    MalformedAmount { value: String },

    /// User identifier text could not be parsed
    #[error("Invalid user ID format '{value}'")]
    MalformedUserId { value: String },

    /// Instant is not RFC 3339
    #[error("Invalid time format '{value}': {reason}")]
    MalformedInstant { value: String, reason: String },

    /// Display name outside the allowed length
    #[error("Name must be between {min} and {max} characters, got {len}")]
    NameLength { len: usize, min: usize, max: usize },

    /// Sender and receiver are the same user
    #[error("User {user} cannot transfer to themselves")]
    SelfTransfer { user: UserId },
}

/// Main error type for the ledger engine
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Referenced user does not exist
    #[error("{party} not found with ID {user}")]
    UserNotFound { user: UserId, party: Party },

    /// A user with this name is already registered
    #[error("Username '{name}' already taken")]
    UserAlreadyExists { name: String },

    /// A user with this id is already registered
    #[error("User ID {user} already registered")]
    DuplicateUserId { user: UserId },

    /// Debit larger than the current balance
    ///
    /// The balance is unchanged.
    #[error("Insufficient balance for user {user}: balance {balance}, requested {requested}")]
    InsufficientBalance {
        user: UserId,
        balance: Decimal,
        requested: Decimal,
    },

    /// Crediting would push the balance past the representable range
    ///
    /// Also returned by reads whose records no longer sum to a representable
    /// balance.
    #[error("Balance of user {user} would overflow")]
    BalanceOverflow { user: UserId },

    /// Persistence failure; the unit of work was rolled back
    #[error("Storage error: {message}")]
    Storage { message: String },
}

impl From<std::io::Error> for LedgerError {
    fn from(error: std::io::Error) -> Self {
        LedgerError::Storage {
            message: error.to_string(),
        }
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(error: serde_json::Error) -> Self {
        LedgerError::Storage {
            message: format!("journal encoding: {}", error),
        }
    }
}

// Helper functions for creating common errors

impl LedgerError {
    /// Create a UserNotFound error
    pub fn user_not_found(user: UserId, party: Party) -> Self {
        LedgerError::UserNotFound { user, party }
    }

    /// Create an InsufficientBalance error
    pub fn insufficient_balance(user: UserId, balance: Decimal, requested: Decimal) -> Self {
        LedgerError::InsufficientBalance {
            user,
            balance,
            requested,
        }
    }

    /// Create a Storage error
    pub fn storage(message: impl Into<String>) -> Self {
        LedgerError::Storage {
            message: message.into(),
        }
    }

    /// True for failures caused by the caller's input rather than the store
    pub fn is_client_error(&self) -> bool {
        !matches!(self, LedgerError::Storage { .. })
    }
}

impl ValidationError {
    /// Create a MalformedInstant error
    pub fn malformed_instant(value: &str, reason: impl fmt::Display) -> Self {
        ValidationError::MalformedInstant {
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::non_positive(
        LedgerError::Validation(ValidationError::NonPositiveAmount { amount: Decimal::ZERO }),
        "Validation failed: Amount must be positive, got 0"
    )]
    #[case::malformed_user(
        LedgerError::Validation(ValidationError::MalformedUserId { value: "abc".to_string() }),
        "Validation failed: Invalid user ID format 'abc'"
    )]
    #[case::self_transfer(
        LedgerError::Validation(ValidationError::SelfTransfer { user: 3 }),
        "Validation failed: User 3 cannot transfer to themselves"
    )]
    #[case::user_not_found(
        LedgerError::UserNotFound { user: 42, party: Party::Account },
        "User not found with ID 42"
    )]
    #[case::sender_not_found(
        LedgerError::UserNotFound { user: 1, party: Party::Sender },
        "Sender not found with ID 1"
    )]
    #[case::receiver_not_found(
        LedgerError::UserNotFound { user: 2, party: Party::Receiver },
        "Receiver not found with ID 2"
    )]
    #[case::insufficient_balance(
        LedgerError::InsufficientBalance { user: 1, balance: Decimal::from(60), requested: Decimal::from(200) },
        "Insufficient balance for user 1: balance 60, requested 200"
    )]
    #[case::excess_precision(
        LedgerError::Validation(ValidationError::ExcessPrecision { amount: Decimal::new(1, 5), max_scale: 4 }),
        "Validation failed: Amount 0.00001 has more than 4 decimal places"
    )]
    #[case::balance_overflow(
        LedgerError::BalanceOverflow { user: 7 },
        "Balance of user 7 would overflow"
    )]
    #[case::storage(
        LedgerError::Storage { message: "disk full".to_string() },
        "Storage error: disk full"
    )]
    fn test_error_display(#[case] error: LedgerError, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }

    #[rstest]
    #[case::user_not_found(
        LedgerError::user_not_found(5, Party::Receiver),
        LedgerError::UserNotFound { user: 5, party: Party::Receiver }
    )]
    #[case::insufficient_balance(
        LedgerError::insufficient_balance(1, Decimal::ONE, Decimal::TWO),
        LedgerError::InsufficientBalance { user: 1, balance: Decimal::ONE, requested: Decimal::TWO }
    )]
    #[case::storage(
        LedgerError::storage("boom"),
        LedgerError::Storage { message: "boom".to_string() }
    )]
    fn test_helper_functions(#[case] result: LedgerError, #[case] expected: LedgerError) {
        assert_eq!(result, expected);
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "Permission denied");
        let error: LedgerError = io_error.into();
        assert!(matches!(error, LedgerError::Storage { .. }));
        assert!(!error.is_client_error());
        assert_eq!(error.to_string(), "Storage error: Permission denied");
    }

    #[test]
    fn test_validation_converts_into_ledger_error() {
        let error: LedgerError = ValidationError::NameLength {
            len: 0,
            min: 1,
            max: 10,
        }
        .into();
        assert!(error.is_client_error());
        assert_eq!(
            error.to_string(),
            "Validation failed: Name must be between 1 and 10 characters, got 0"
        );
    }
}
