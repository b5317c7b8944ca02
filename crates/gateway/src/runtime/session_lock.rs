//! Per-user concurrency control.
//!
//! Only one turn runs per user at a time. A second message arriving while
//! a turn is in flight waits for it; a third is rejected as busy.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

struct Slot {
    sem: Arc<Semaphore>,
    /// Set while one caller is queued behind the running turn.
    queued: AtomicBool,
}

/// Each user id maps to a `Semaphore(1)` plus a single waiting place.
pub struct SessionLockMap {
    locks: Mutex<HashMap<String, Arc<Slot>>>,
}

impl Default for SessionLockMap {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionLockMap {
    pub fn new() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Acquire the run lock for a user. Hold the permit for the duration
    /// of the turn; it releases on drop.
    pub async fn acquire(&self, user_id: &str) -> Result<OwnedSemaphorePermit, SessionBusy> {
        let slot = {
            let mut locks = self.locks.lock();
            locks
                .entry(user_id.to_owned())
                .or_insert_with(|| {
                    Arc::new(Slot {
                        sem: Arc::new(Semaphore::new(1)),
                        queued: AtomicBool::new(false),
                    })
                })
                .clone()
        };

        if let Ok(permit) = slot.sem.clone().try_acquire_owned() {
            return Ok(permit);
        }

        // One turn running. Allow one waiter, reject the rest.
        if slot.queued.swap(true, Ordering::AcqRel) {
            return Err(SessionBusy);
        }
        let _queued = QueuedGuard(&slot.queued);
        slot.sem.clone().acquire_owned().await.map_err(|_| SessionBusy)
    }

    /// Number of tracked users (for monitoring).
    pub fn session_count(&self) -> usize {
        self.locks.lock().len()
    }

    /// Drop lock slots nobody holds or waits on.
    pub fn prune_idle(&self) {
        let mut locks = self.locks.lock();
        locks.retain(|_, slot| {
            slot.sem.available_permits() == 0 || slot.queued.load(Ordering::Acquire)
        });
    }
}

/// Frees the waiting place on drop, including when the waiting future
/// is cancelled.
struct QueuedGuard<'a>(&'a AtomicBool);

impl Drop for QueuedGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// A turn is already running for this user and another is queued.
#[derive(Debug)]
pub struct SessionBusy;

impl std::fmt::Display for SessionBusy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "session is busy; a turn is already in progress")
    }
}

impl std::error::Error for SessionBusy {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn sequential_access() {
        let map = SessionLockMap::new();
        drop(map.acquire("u1").await.unwrap());
        drop(map.acquire("u1").await.unwrap());
    }

    #[tokio::test]
    async fn different_users_run_concurrently() {
        let map = SessionLockMap::new();
        let _p1 = map.acquire("u1").await.unwrap();
        let _p2 = map.acquire("u2").await.unwrap();
        assert_eq!(map.session_count(), 2);
    }

    #[tokio::test]
    async fn second_caller_waits_third_is_rejected() {
        let map = Arc::new(SessionLockMap::new());
        let p1 = map.acquire("u1").await.unwrap();

        let waiter = {
            let map = map.clone();
            tokio::spawn(async move { map.acquire("u1").await.map(|_| 42) })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(map.acquire("u1").await.is_err());

        drop(p1);
        assert_eq!(waiter.await.unwrap().unwrap(), 42);
    }

    #[tokio::test]
    async fn aborted_waiter_frees_the_queue_place() {
        let map = Arc::new(SessionLockMap::new());
        let p1 = map.acquire("u1").await.unwrap();

        let waiter = {
            let map = map.clone();
            tokio::spawn(async move { map.acquire("u1").await.is_ok() })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        waiter.abort();
        assert!(waiter.await.unwrap_err().is_cancelled());

        let next = {
            let map = map.clone();
            tokio::spawn(async move { map.acquire("u1").await.is_ok() })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        drop(p1);
        assert!(next.await.unwrap());
    }

    #[tokio::test]
    async fn timed_out_waiter_frees_the_queue_place() {
        let map = SessionLockMap::new();
        let _p1 = map.acquire("u1").await.unwrap();

        let waited = tokio::time::timeout(Duration::from_millis(20), map.acquire("u1")).await;
        assert!(waited.is_err());

        let again = tokio::time::timeout(Duration::from_millis(20), map.acquire("u1")).await;
        assert!(again.is_err(), "second waiter should queue, not be rejected as busy");
    }

    #[tokio::test]
    async fn prune_keeps_held_locks() {
        let map = SessionLockMap::new();
        let _held = map.acquire("u1").await.unwrap();
        drop(map.acquire("u2").await.unwrap());
        map.prune_idle();
        assert_eq!(map.session_count(), 1);
    }
}
