//! ID generation with recycling of released IDs

use parking_lot::Mutex;
use std::sync::atomic::{self, AtomicU64};

/// Thread-safe ID generator.
///
/// IDs start at 1. Released IDs are handed out again before the counter
/// advances, lowest first.
pub struct IdGenerator<T: Copy + Into<u64> + TryFrom<u64> + Ord> {
    released: Mutex<Vec<T>>,
    next_id: AtomicU64,
}

impl<T: Copy + Into<u64> + TryFrom<u64> + Ord> IdGenerator<T> {
    pub fn new() -> Self {
        Self {
            released: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Get the next available ID, or `None` once the ID space is exhausted
    pub fn next_id(&self) -> Option<T> {
        {
            let mut released = self.released.lock();
            if let Some(pos) = released.iter().enumerate().min_by_key(|(_, id)| **id).map(|(i, _)| i) {
                return Some(released.swap_remove(pos));
            }
        }

        let id = self.next_id.fetch_add(1, atomic::Ordering::Relaxed);
        T::try_from(id).ok()
    }

    /// Return an ID to the pool
    pub fn release(&self, id: T) {
        let mut released = self.released.lock();
        if !released.contains(&id) && id.into() < self.next_id.load(atomic::Ordering::Relaxed) {
            released.push(id);
        }
    }
}

impl<T: Copy + Into<u64> + TryFrom<u64> + Ord> Default for IdGenerator<T> {
    fn default() -> Self {
        Self::new()
    }
}
