//! Per-entry mutual exclusion

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::models::EntryId;

/// Map of async locks keyed by entry id.
///
/// Locks are created on demand and dropped once no task holds or awaits them.
#[derive(Debug, Default)]
pub struct EntryLocks {
    locks: Mutex<HashMap<EntryId, Arc<AsyncMutex<()>>>>,
}

impl EntryLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until no other guard for `entry_id` is alive
    pub async fn lock(&self, entry_id: EntryId) -> EntryGuard<'_> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(locks.entry(entry_id).or_default())
        };

        let guard = lock.lock_owned().await;
        EntryGuard {
            owner: self,
            entry_id,
            guard: Some(guard),
        }
    }

    /// Number of entries with a live lock
    pub fn active(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn release(&self, entry_id: EntryId) {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        // Only the map's own handle left: no holder and no waiter
        if locks
            .get(&entry_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&entry_id);
        }
    }
}

/// Exclusive hold on one entry; released on drop
#[derive(Debug)]
pub struct EntryGuard<'a> {
    owner: &'a EntryLocks,
    entry_id: EntryId,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for EntryGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        self.owner.release(self.entry_id);
    }
}
