//! User storage.
//!
//! [`UserStore`] is the seam the handlers depend on; [`MemoryStore`] is the
//! only implementation. All operations are linear scans over a short list.

use std::sync::{Mutex, MutexGuard, PoisonError};

use super::model::{User, UserDraft};

/// CRUD over user records, keyed by id.
pub trait UserStore: Send + Sync {
    /// Every user, in insertion order.
    fn list(&self) -> Vec<User>;

    fn get(&self, id: u64) -> Option<User>;

    /// Stores `draft` under a fresh id and returns the stored record.
    fn create(&self, draft: UserDraft) -> User;

    /// Replaces name and email of user `id`. `None` when there is no such user.
    fn update(&self, id: u64, draft: UserDraft) -> Option<User>;

    /// Removes user `id`. Returns `false` when there was no such user.
    fn delete(&self, id: u64) -> bool;
}

/// In-process store behind one coarse lock.
///
/// Ids are never handed out twice: the next id is one past the larger of the
/// current maximum and the highest id ever assigned.
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

struct Inner {
    users: Vec<User>,
    last_id: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_users(Vec::new())
    }

    pub fn with_users(users: Vec<User>) -> Self {
        let last_id = users.iter().map(|u| u.id).max().unwrap_or(0);
        Self { inner: Mutex::new(Inner { users, last_id }) }
    }

    /// The three records every fresh process starts with.
    pub fn seeded() -> Self {
        let seed = [(1, "Alice"), (2, "Bob"), (3, "Charlie")];
        Self::with_users(
            seed.into_iter()
                .map(|(id, name)| User {
                    id,
                    name: name.to_owned(),
                    email: format!("{}@example.com", name.to_lowercase()),
                })
                .collect(),
        )
    }

    // Every operation leaves the list consistent before it can panic, so a
    // poisoned lock still guards valid data.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MemoryStore {
    fn default() -> Self { Self::new() }
}

impl UserStore for MemoryStore {
    fn list(&self) -> Vec<User> {
        self.lock().users.clone()
    }

    fn get(&self, id: u64) -> Option<User> {
        self.lock().users.iter().find(|u| u.id == id).cloned()
    }

    fn create(&self, draft: UserDraft) -> User {
        let mut inner = self.lock();
        let max = inner.users.iter().map(|u| u.id).max().unwrap_or(0);
        let id = max.max(inner.last_id) + 1;
        inner.last_id = id;

        let user = User { id, name: draft.name, email: draft.email };
        inner.users.push(user.clone());
        user
    }

    fn update(&self, id: u64, draft: UserDraft) -> Option<User> {
        let mut inner = self.lock();
        let user = inner.users.iter_mut().find(|u| u.id == id)?;
        user.name = draft.name;
        user.email = draft.email;
        Some(user.clone())
    }

    fn delete(&self, id: u64) -> bool {
        let mut inner = self.lock();
        let Some(pos) = inner.users.iter().position(|u| u.id == id) else {
            return false;
        };
        inner.users.remove(pos);
        true
    }
}
