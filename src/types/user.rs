//! User-related types for the credit ledger
//!
//! Users belong to the identity subsystem. The ledger reads their id and
//! existence, and their display name for balance reports.

use super::transaction::UserId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A ledger participant as seen by the engine
///
/// Credentials are owned by the authentication layer and never reach the
/// ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// The user ID
    pub id: UserId,

    /// Display name (1 to 10 characters)
    pub name: String,

    /// Whether the user holds the administrator role
    pub is_admin: bool,
}

impl User {
    /// Create a non-administrator user
    pub fn new(id: UserId, name: impl Into<String>) -> Self {
        User {
            id,
            name: name.into(),
            is_admin: false,
        }
    }

    /// Create an administrator
    pub fn admin(id: UserId, name: impl Into<String>) -> Self {
        User {
            is_admin: true,
            ..User::new(id, name)
        }
    }
}

/// Derived balance of one user
///
/// Never stored; built on demand from the user's transactions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserBalance {
    pub user_id: UserId,
    pub user_name: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub balance: Decimal,
}
