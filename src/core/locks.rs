//! Per-user exclusive sections
//!
//! Mutating operations hold their user's section from the balance check until
//! the unit is committed, so two debits from the same user cannot both pass the
//! check against the same balance, and two credits cannot both claim the same
//! headroom.
//!
//! # Lock order
//!
//! Operations touching two users acquire the lower user id first. Every
//! acquirer follows the same order, so opposing transfers between one pair of
//! users cannot deadlock.

use crate::types::UserId;
use dashmap::DashMap;
use parking_lot::{Mutex, RawMutex};
use std::sync::Arc;

type SectionGuard = parking_lot::lock_api::ArcMutexGuard<RawMutex, ()>;

/// Table of per-user mutexes, created on first use
#[derive(Debug, Default)]
pub struct UserLocks {
    sections: DashMap<UserId, Arc<Mutex<()>>>,
}

/// Held exclusive sections; released on drop
#[must_use = "the section is released as soon as the guard is dropped"]
pub struct UserGuard {
    held: Vec<SectionGuard>,
}

impl std::fmt::Debug for UserGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserGuard")
            .field("sections", &self.held.len())
            .finish()
    }
}

impl UserLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn section(&self, user: UserId) -> Arc<Mutex<()>> {
        // Clone the Arc out so the map shard is not held while blocking
        Arc::clone(
            self.sections
                .entry(user)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .value(),
        )
    }

    /// Enter one user's exclusive section
    pub fn lock(&self, user: UserId) -> UserGuard {
        UserGuard {
            held: vec![self.section(user).lock_arc()],
        }
    }

    /// Enter two users' sections in ascending id order
    ///
    /// Locks once when both ids are equal.
    pub fn lock_pair(&self, first: UserId, second: UserId) -> UserGuard {
        let (low, high) = if first <= second {
            (first, second)
        } else {
            (second, first)
        };

        let mut held = Vec::with_capacity(2);
        held.push(self.section(low).lock_arc());
        if high != low {
            held.push(self.section(high).lock_arc());
        }
        UserGuard { held }
    }
}
