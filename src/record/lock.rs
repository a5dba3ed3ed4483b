//! Per-record lock table.
//!
//! Counter updates are a read-modify-write of a whole record file, so two
//! updates to the same id must never interleave. Each id gets its own async
//! mutex; ids never contend with each other.

use std::collections::HashMap;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type Slot = Arc<AsyncMutex<()>>;

/// Table of per-id mutexes.
///
/// Entries are created on demand and dropped again once the last lease for
/// an id is released, so the table only holds ids with in-flight updates.
#[derive(Debug, Default)]
pub struct RecordLocks {
    slots: Arc<Mutex<HashMap<String, Slot>>>,
}

impl RecordLocks {
    /// Create an empty lock table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `id`.
    ///
    /// The lease exists before the wait starts, so a caller that gives up
    /// while queued still removes the table entry it created.
    pub async fn acquire(&self, id: &str) -> RecordLease {
        let slot = {
            let mut slots = lock_table(&self.slots);
            slots.entry(id.to_string()).or_default().clone()
        };

        let mut pending = Pending {
            wait: Box::pin(slot.lock_owned()),
            lease: RecordLease {
                id: id.to_string(),
                guard: None,
                slots: Arc::clone(&self.slots),
            },
        };

        let guard = (&mut pending.wait).await;
        let mut lease = pending.lease;
        lease.guard = Some(guard);
        lease
    }

    /// Number of ids currently tracked.
    pub fn tracked(&self) -> usize {
        lock_table(&self.slots).len()
    }
}

/// An acquire in progress. Fields drop in order, so a cancelled wait lets go
/// of its slot before the lease checks whether the entry is idle.
struct Pending<F> {
    wait: Pin<Box<F>>,
    lease: RecordLease,
}

/// The table only guards map bookkeeping; a panic elsewhere cannot leave it
/// half-updated, so a poisoned lock is still usable.
fn lock_table(slots: &Mutex<HashMap<String, Slot>>) -> MutexGuard<'_, HashMap<String, Slot>> {
    slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Exclusive access to one record. Released on drop.
#[derive(Debug)]
pub struct RecordLease {
    id: String,
    guard: Option<OwnedMutexGuard<()>>,
    slots: Arc<Mutex<HashMap<String, Slot>>>,
}

impl Drop for RecordLease {
    fn drop(&mut self) {
        // Release the mutex first so the table holds the only reference when idle.
        drop(self.guard.take());

        let mut slots = lock_table(&self.slots);
        if let Some(slot) = slots.get(&self.id) {
            if Arc::strong_count(slot) == 1 {
                slots.remove(&self.id);
            }
        }
    }
}
