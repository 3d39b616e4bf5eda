//! Thread-safe wrapper around the LRU store (C2).
//!
//! A single `parking_lot::Mutex` guards one [`LruStore`]; there is no
//! sharding. Throughput under contention comes from the fact that every
//! operation the store performs — pointer/index rewiring, a hash lookup — is
//! cheap, not from splitting the lock.
//!
//! The underlying store is constructed lazily: a freshly built
//! `ConcurrentStore` holds no [`LruStore`] at all until the first `add`,
//! mirroring the original cache's nil-until-first-write `mainCache.cache`
//! field.

use parking_lot::Mutex;

use crate::lru::{CacheKey, LruStore, Value};

/// A mutex-guarded [`LruStore`], lazily allocated on first write.
pub struct ConcurrentStore<K, V>
where
    K: CacheKey,
    V: Value,
{
    max_memory: u64,
    inner: Mutex<Option<LruStore<K, V>>>,
}

impl<K, V> ConcurrentStore<K, V>
where
    K: CacheKey,
    V: Value + Clone,
{
    /// Creates a wrapper with the given byte budget. No allocation happens
    /// until the first [`ConcurrentStore::add`].
    #[must_use]
    pub fn new(max_memory: u64) -> Self {
        Self {
            max_memory,
            inner: Mutex::new(None),
        }
    }

    /// Looks up `key`, returning a clone of the value on a hit. A lookup
    /// against a store that has never been written to is always a miss and
    /// never allocates the underlying [`LruStore`].
    pub fn get(&self, key: &K) -> Option<V> {
        let mut guard = self.inner.lock();
        guard.as_mut()?.get(key).cloned()
    }

    /// Inserts or updates `key`, allocating the underlying store on first
    /// use.
    pub fn add(&self, key: K, value: V) {
        let mut guard = self.inner.lock();
        guard
            .get_or_insert_with(|| LruStore::new(self.max_memory))
            .add(key, value);
    }

    /// Number of resident entries; `0` for a store that has never been
    /// written to.
    pub fn len(&self) -> usize {
        self.inner.lock().as_ref().map_or(0, LruStore::len)
    }

    /// True if the store holds no entries (including a never-written
    /// store).
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current byte accounting total; `0` for a never-written store.
    pub fn used_memory(&self) -> u64 {
        self.inner.lock().as_ref().map_or(0, LruStore::used_memory)
    }
}

impl<K, V> std::fmt::Debug for ConcurrentStore<K, V>
where
    K: CacheKey,
    V: Value + Clone,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConcurrentStore")
            .field("max_memory", &self.max_memory)
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}
