//! Bounded LRU store with byte-accounted eviction (C1).
//!
//! A key-to-handle map plus a doubly linked recency sequence, laid out as an
//! arena (`Vec<Option<Slot<K, V>>>`) addressed by index rather than raw
//! pointers. The front of the sequence is least-recently-used, the back is
//! most-recently-used.
//!
//! Not thread-safe on its own; [`crate::concurrent::ConcurrentStore`] guards
//! one of these behind a single mutex.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

/// Any payload exposing its own byte length, for memory accounting.
pub trait Value {
    /// Bytes this value occupies against the store's `maxMemory` budget.
    fn len(&self) -> usize;

    /// True if this value occupies zero bytes.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A key usable by the store: hashable, comparable, cheap to clone (the key
/// is duplicated inside each entry so eviction can remove it from the index
/// without a back-pointer), and able to report its own byte length.
pub trait CacheKey: Eq + Hash + Clone {
    /// Bytes this key contributes to `usedMemory`.
    fn byte_len(&self) -> usize;
}

impl CacheKey for String {
    fn byte_len(&self) -> usize {
        self.len()
    }
}

struct Slot<K, V> {
    key: K,
    value: V,
    prev: Option<usize>,
    next: Option<usize>,
}

/// A bounded, byte-accounted LRU store.
///
/// `max_memory == 0` means unbounded: the capacity loop in [`LruStore::add`]
/// never evicts.
pub struct LruStore<K, V>
where
    K: CacheKey,
    V: Value,
{
    max_memory: u64,
    used_memory: u64,
    index: HashMap<K, usize>,
    slots: Vec<Option<Slot<K, V>>>,
    free: Vec<usize>,
    /// Front of the sequence: least recently used.
    head: Option<usize>,
    /// Back of the sequence: most recently used.
    tail: Option<usize>,
    on_remove: Option<Box<dyn FnMut(&K, &V) + Send>>,
}

impl<K, V> LruStore<K, V>
where
    K: CacheKey,
    V: Value,
{
    /// Creates an empty store with the given memory budget and no eviction
    /// notifier.
    #[must_use]
    pub fn new(max_memory: u64) -> Self {
        Self {
            max_memory,
            used_memory: 0,
            index: HashMap::new(),
            slots: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            on_remove: None,
        }
    }

    /// Creates an empty store that invokes `on_remove` for every entry the
    /// capacity loop in [`LruStore::add`] evicts.
    #[must_use]
    pub fn with_on_remove(max_memory: u64, on_remove: impl FnMut(&K, &V) + Send + 'static) -> Self {
        Self {
            on_remove: Some(Box::new(on_remove)),
            ..Self::new(max_memory)
        }
    }

    /// Current number of resident entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// True if the store holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Current byte accounting total: `Σ len(key) + value.len()`.
    #[must_use]
    pub fn used_memory(&self) -> u64 {
        self.used_memory
    }

    /// The configured byte budget; `0` means unbounded.
    #[must_use]
    pub fn max_memory(&self) -> u64 {
        self.max_memory
    }

    /// Looks up `key`, moving it to the most-recently-used position on a
    /// hit. Never triggers eviction. O(1) expected.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let idx = *self.index.get(key)?;
        self.move_to_mru(idx);
        self.slots[idx].as_ref().map(|slot| &slot.value)
    }

    /// Inserts or updates `key`, then evicts least-recently-used entries
    /// until `used_memory <= max_memory`, or the store is empty.
    ///
    /// If `key` already exists, its value is replaced in place and
    /// `used_memory` shifts by `len(new) - len(old)`. A brand-new entry that
    /// alone exceeds `max_memory` is inserted and then evicted by the loop
    /// below — this is the documented edge case, not a bug.
    pub fn add(&mut self, key: K, value: V) {
        if let Some(&idx) = self.index.get(&key) {
            let old_len = self.slots[idx]
                .as_ref()
                .expect("index entry always points at a live slot")
                .value
                .len() as u64;
            let new_len = value.len() as u64;
            self.slots[idx]
                .as_mut()
                .expect("index entry always points at a live slot")
                .value = value;
            self.used_memory = self.used_memory + new_len - old_len;
            self.move_to_mru(idx);
        } else {
            let added = key.byte_len() as u64 + value.len() as u64;
            let idx = self.alloc_slot(key.clone(), value);
            self.index.insert(key, idx);
            self.push_back(idx);
            self.used_memory += added;
        }

        while self.max_memory > 0 && self.used_memory > self.max_memory {
            self.evict();
        }
    }

    /// Removes the least-recently-used entry, if any, invoking the eviction
    /// notifier. Exposed for tests and for callers that want to shed
    /// entries without inserting.
    pub fn evict(&mut self) -> Option<(K, V)> {
        let idx = self.head?;
        self.unlink(idx);
        let slot = self.slots[idx]
            .take()
            .expect("head always indexes a live slot");
        self.free.push(idx);
        self.index.remove(&slot.key);
        self.used_memory -= slot.key.byte_len() as u64 + slot.value.len() as u64;
        if let Some(on_remove) = self.on_remove.as_mut() {
            on_remove(&slot.key, &slot.value);
        }
        Some((slot.key, slot.value))
    }

    fn alloc_slot(&mut self, key: K, value: V) -> usize {
        let slot = Slot {
            key,
            value,
            prev: None,
            next: None,
        };
        if let Some(idx) = self.free.pop() {
            self.slots[idx] = Some(slot);
            idx
        } else {
            self.slots.push(Some(slot));
            self.slots.len() - 1
        }
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = {
            let slot = self.slots[idx].as_ref().expect("unlinking a live slot");
            (slot.prev, slot.next)
        };
        match prev {
            Some(p) => self.slots[p].as_mut().expect("prev is live").next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.slots[n].as_mut().expect("next is live").prev = prev,
            None => self.tail = prev,
        }
    }

    fn push_back(&mut self, idx: usize) {
        let old_tail = self.tail;
        {
            let slot = self.slots[idx].as_mut().expect("pushing a live slot");
            slot.prev = old_tail;
            slot.next = None;
        }
        match old_tail {
            Some(t) => self.slots[t].as_mut().expect("old tail is live").next = Some(idx),
            None => self.head = Some(idx),
        }
        self.tail = Some(idx);
    }

    fn move_to_mru(&mut self, idx: usize) {
        if self.tail == Some(idx) {
            return;
        }
        self.unlink(idx);
        self.push_back(idx);
    }
}

impl<K, V> fmt::Debug for LruStore<K, V>
where
    K: CacheKey,
    V: Value,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruStore")
            .field("max_memory", &self.max_memory)
            .field("used_memory", &self.used_memory)
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq)]
    struct FixedValue(Vec<u8>);

    impl Value for FixedValue {
        fn len(&self) -> usize {
            self.0.len()
        }
    }

    fn bytes(n: usize) -> FixedValue {
        FixedValue(vec![0u8; n])
    }

    #[test]
    fn miss_on_empty_store() {
        let mut store: LruStore<String, FixedValue> = LruStore::new(0);
        assert_eq!(store.get(&"k1".to_string()), None);
    }

    #[test]
    fn s1_lru_eviction_scenario() {
        let evicted = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        let evicted_cb = evicted.clone();
        let mut store: LruStore<String, FixedValue> =
            LruStore::with_on_remove(10, move |k: &String, v: &FixedValue| {
                evicted_cb.lock().unwrap().push((k.clone(), v.clone()));
            });

        store.add("k1".to_string(), bytes(2)); // 2 (key) + 2 (value) = 4
        store.add("k2".to_string(), bytes(2)); // used = 8
        assert_eq!(store.used_memory(), 8);

        store.add("k3".to_string(), bytes(2)); // would be 12 -> evict k1
        assert_eq!(store.used_memory(), 8);
        assert_eq!(store.len(), 2);
        assert_eq!(
            evicted.lock().unwrap().as_slice(),
            &[("k1".to_string(), bytes(2))]
        );

        assert!(store.get(&"k2".to_string()).is_some());
        assert!(store.get(&"k1".to_string()).is_none());
    }

    #[test]
    fn s2_update_accounting_scenario() {
        let mut store: LruStore<String, FixedValue> = LruStore::new(20);
        store.add("a".to_string(), bytes(5)); // 1 + 5 = 6
        store.add("b".to_string(), bytes(5)); // 1 + 5 = 6, total 12
        assert_eq!(store.used_memory(), 12);

        store.add("a".to_string(), bytes(9)); // update in place: 1 + 9 = 10, total 16
        assert_eq!(store.used_memory(), 16);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn recency_is_updated_by_get() {
        let mut store: LruStore<String, FixedValue> = LruStore::new(6);
        store.add("a".to_string(), bytes(1)); // 2
        store.add("b".to_string(), bytes(1)); // 2, total 4

        // touch "a" so "b" becomes the eviction candidate instead
        assert!(store.get(&"a".to_string()).is_some());

        store.add("c".to_string(), bytes(1)); // total 6, fits exactly
        store.add("d".to_string(), bytes(1)); // now evicts the LRU: "b"

        assert!(store.get(&"a".to_string()).is_some());
        assert!(store.get(&"b".to_string()).is_none());
    }

    #[test]
    fn oversized_entry_is_inserted_then_evicted() {
        let mut store: LruStore<String, FixedValue> = LruStore::new(4);
        store.add("toobig".to_string(), bytes(100));
        assert!(store.is_empty());
        assert_eq!(store.used_memory(), 0);
    }

    #[test]
    fn unbounded_store_never_evicts() {
        let mut store: LruStore<String, FixedValue> = LruStore::new(0);
        for i in 0..1000 {
            store.add(format!("k{i}"), bytes(64));
        }
        assert_eq!(store.len(), 1000);
    }

    #[test]
    fn evict_on_empty_store_is_a_noop() {
        let mut store: LruStore<String, FixedValue> = LruStore::new(10);
        assert_eq!(store.evict(), None);
    }

    #[test]
    fn slots_are_reused_after_eviction() {
        let mut store: LruStore<String, FixedValue> = LruStore::new(8);
        store.add("a".to_string(), bytes(3)); // 1+3=4
        store.add("b".to_string(), bytes(3)); // 1+3=4, total 8
        store.add("c".to_string(), bytes(3)); // evicts "a"
        assert_eq!(store.len(), 2);
        assert!(store.get(&"b".to_string()).is_some());
        assert!(store.get(&"c".to_string()).is_some());
    }
}
