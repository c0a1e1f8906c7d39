//! Per-key mutual exclusion
//!
//! At most one caller at a time runs a critical section for a given land or
//! battle. Callers that need both take the battle lock first.

use std::hash::Hash;
use std::sync::Arc;

use ahash::AHashMap;
use parking_lot::Mutex;

#[derive(Debug)]
pub struct KeyedLocks<K> {
    slots: Mutex<AHashMap<K, Arc<Mutex<()>>>>,
}

impl<K> Default for KeyedLocks<K> {
    fn default() -> Self {
        Self {
            slots: Mutex::new(AHashMap::new()),
        }
    }
}

impl<K: Eq + Hash> KeyedLocks<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` while holding the lock for `key`
    pub fn with_lock<R>(&self, key: K, f: impl FnOnce() -> R) -> R {
        let slot = Arc::clone(self.slots.lock().entry(key).or_default());
        let _guard = slot.lock();
        f()
    }

    /// Number of keys that have ever been locked
    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.lock().is_empty()
    }
}
