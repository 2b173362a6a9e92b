use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

/// Lock table keyed by post id.
///
/// Serialises read-modify-write cycles on one post while leaving other posts
/// untouched. An entry lives only while someone holds or waits for it.
#[derive(Default)]
pub struct PostLocks {
    locks: DashMap<Uuid, Arc<Mutex<()>>>,
}

/// Exclusive hold on one post, released on drop
pub struct PostLockGuard<'a> {
    table: &'a PostLocks,
    post_id: Uuid,
    guard: Option<OwnedMutexGuard<()>>,
}

impl PostLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, post_id: Uuid) -> PostLockGuard<'_> {
        // Clone out of the map so no shard lock is held across the await
        let mutex = self.locks.entry(post_id).or_default().clone();
        let guard = mutex.lock_owned().await;

        PostLockGuard {
            table: self,
            post_id,
            guard: Some(guard),
        }
    }

    /// Number of posts with a live lock entry
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

impl Drop for PostLockGuard<'_> {
    fn drop(&mut self) {
        self.guard.take();
        // Only the map's own reference left: nobody is holding or waiting
        self.table
            .locks
            .remove_if(&self.post_id, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}
