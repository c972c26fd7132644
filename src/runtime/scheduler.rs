//! Bookkeeping for delayed notices
//!
//! Every user with pending notices has a root `CancellationToken`; each
//! notice runs on a child of it. Cancelling a user removes the entry, so a
//! late-finishing task from an older generation cannot touch the counts of
//! notices scheduled afterwards.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio_util::sync::CancellationToken;

/// Handed to a notice task when it is scheduled
#[derive(Debug, Clone)]
pub struct NoticeTicket {
    pub token: CancellationToken,
    pub generation: u64,
}

struct UserNotices {
    root: CancellationToken,
    generation: u64,
    pending: usize,
}

#[derive(Default)]
struct Inner {
    users: HashMap<String, UserNotices>,
    next_generation: u64,
}

#[derive(Default)]
pub struct NoticeScheduler {
    inner: Mutex<Inner>,
}

impl NoticeScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record one more pending notice for `user_id`
    pub fn register(&self, user_id: &str) -> NoticeTicket {
        let mut inner = self.lock();
        let Inner {
            users,
            next_generation,
        } = &mut *inner;

        let entry = users.entry(user_id.to_string()).or_insert_with(|| {
            *next_generation += 1;
            UserNotices {
                root: CancellationToken::new(),
                generation: *next_generation,
                pending: 0,
            }
        });
        entry.pending += 1;

        NoticeTicket {
            token: entry.root.child_token(),
            generation: entry.generation,
        }
    }

    /// A notice finished waiting. Stale generations are ignored.
    pub fn complete(&self, user_id: &str, generation: u64) {
        let mut inner = self.lock();
        let Some(entry) = inner.users.get_mut(user_id) else {
            return;
        };
        if entry.generation != generation {
            return;
        }
        entry.pending = entry.pending.saturating_sub(1);
        if entry.pending == 0 {
            inner.users.remove(user_id);
        }
    }

    /// Cancel every pending notice for one user, returning how many there were
    pub fn cancel_user(&self, user_id: &str) -> usize {
        let removed = self.lock().users.remove(user_id);
        match removed {
            Some(entry) => {
                entry.root.cancel();
                entry.pending
            }
            None => 0,
        }
    }

    /// Cancel every pending notice for every user
    pub fn cancel_all(&self) -> usize {
        let drained: Vec<UserNotices> = self.lock().users.drain().map(|(_, v)| v).collect();
        drained
            .into_iter()
            .map(|entry| {
                entry.root.cancel();
                entry.pending
            })
            .sum()
    }

    pub fn pending(&self, user_id: &str) -> usize {
        self.lock().users.get(user_id).map_or(0, |e| e.pending)
    }
}
