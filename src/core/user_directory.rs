//! Thread-safe in-memory user directory
//!
//! This module provides the `InMemoryUserDirectory` struct, the identity
//! subsystem's user table as the ledger sees it.
//!
//! # Design
//!
//! Users are kept in a `DashMap` keyed by id, with a second `DashMap` keyed by
//! name that enforces name uniqueness. A registration claims its name entry
//! first, so two concurrent registrations of the same name cannot both win.

use crate::core::traits::UserDirectory;
use crate::core::validation::validate_name;
use crate::types::{LedgerError, Party, User, UserId};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU32, Ordering};

/// In-memory user table
#[derive(Debug)]
pub struct InMemoryUserDirectory {
    users: DashMap<UserId, User>,
    names: DashMap<String, UserId>,
    next_id: AtomicU32,
}

impl InMemoryUserDirectory {
    /// Create an empty directory
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
            names: DashMap::new(),
            next_id: AtomicU32::new(1),
        }
    }

    /// Register a new user with the next free id
    ///
    /// # Errors
    ///
    /// * `Validation(NameLength)` - name is empty or longer than 10 characters
    /// * `UserAlreadyExists` - the name is taken
    pub fn register(&self, name: &str, is_admin: bool) -> Result<User, LedgerError> {
        validate_name(name)?;
        loop {
            let id = self.next_id.fetch_add(1, Ordering::SeqCst);
            let user = User {
                id,
                name: name.to_string(),
                is_admin,
            };
            match self.insert(user) {
                // Id taken by an explicit insert; try the next one
                Err(LedgerError::DuplicateUserId { .. }) => continue,
                result => return result,
            }
        }
    }

    /// Insert a user with an explicit id
    ///
    /// # Errors
    ///
    /// * `Validation(NameLength)` - invalid name
    /// * `UserAlreadyExists` - the name is taken
    /// * `DuplicateUserId` - the id is taken
    pub fn insert(&self, user: User) -> Result<User, LedgerError> {
        validate_name(&user.name)?;

        match self.names.entry(user.name.clone()) {
            Entry::Occupied(_) => {
                return Err(LedgerError::UserAlreadyExists {
                    name: user.name.clone(),
                })
            }
            Entry::Vacant(slot) => {
                slot.insert(user.id);
            }
        }

        match self.users.entry(user.id) {
            Entry::Occupied(_) => {
                self.names.remove(&user.name);
                Err(LedgerError::DuplicateUserId { user: user.id })
            }
            Entry::Vacant(slot) => {
                slot.insert(user.clone());
                self.next_id.fetch_max(user.id.saturating_add(1), Ordering::SeqCst);
                tracing::debug!(user = user.id, name = %user.name, "user registered");
                Ok(user)
            }
        }
    }

    /// Grant or revoke the administrator role
    pub fn set_admin(&self, id: UserId, is_admin: bool) -> Result<User, LedgerError> {
        let mut entry = self
            .users
            .get_mut(&id)
            .ok_or_else(|| LedgerError::user_not_found(id, Party::Account))?;
        entry.is_admin = is_admin;
        Ok(entry.clone())
    }

    /// Number of registered users
    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl Default for InMemoryUserDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl UserDirectory for InMemoryUserDirectory {
    fn get(&self, id: UserId) -> Option<User> {
        self.users.get(&id).map(|entry| entry.value().clone())
    }

    fn list(&self) -> Vec<User> {
        let mut users: Vec<User> = self
            .users
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        users.sort_by_key(|user| user.id);
        users
    }
}
