//! In-process adapter for every repository port.
//!
//! Used when no database is configured and by the HTTP integration tests.
//! All tables sit behind one mutex, so each port call is atomic and the
//! guarded writes (`fund`, `record_copy`) see exactly the state they check.
//! Unique keys, `raised <= price` and the cascades mirror the SQL schema.

mod offers;
mod users;
mod wishes;
mod wishlists;

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::domain::{Offer, User, Wish, Wishlist};

#[derive(Debug, Clone)]
struct StoredUser {
    user: User,
    password_hash: String,
}

/// Id sequences start at 1, like `BIGSERIAL`.
#[derive(Debug, Default)]
struct Sequence(i64);

impl Sequence {
    fn next(&mut self) -> i64 {
        self.0 += 1;
        self.0
    }
}

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<i64, StoredUser>,
    wishes: BTreeMap<i64, Wish>,
    offers: BTreeMap<i64, Offer>,
    wishlists: BTreeMap<i64, Wishlist>,
    user_ids: Sequence,
    wish_ids: Sequence,
    offer_ids: Sequence,
    wishlist_ids: Sequence,
}

/// Shared in-memory store. Clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock the tables, reporting a poisoned lock through `on_poisoned`.
    fn lock<E>(&self, on_poisoned: impl FnOnce(&'static str) -> E) -> Result<MutexGuard<'_, Tables>, E> {
        self.tables
            .lock()
            .map_err(|_| on_poisoned("memory store lock poisoned"))
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
