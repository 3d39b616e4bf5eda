//! Consistent-hash peer ring (C4).
//!
//! A sorted sequence of 32-bit hashes plus a `hash -> peer id` map. Each real
//! peer contributes `num_virtual_nodes` synthetic ring points so that keys
//! spread evenly and adding or removing a peer only reassigns a small slice
//! of the keyspace.
//!
//! Mutation (`add_peers`) takes a write lock; lookups take a read lock. The
//! original design leaves ring mutation unserialized and expects the
//! transport to guard it externally — this version guards it itself, which
//! is strictly safer and changes no observable behavior for a caller that
//! already serializes configuration.

use std::collections::HashMap;
use std::fmt;

use parking_lot::RwLock;

/// Default number of synthetic ring points contributed by each peer.
pub const DEFAULT_VIRTUAL_NODES: usize = 50;

fn crc32_ieee(bytes: &[u8]) -> u32 {
    crc32fast::hash(bytes)
}

struct RingState {
    /// Sorted ascending.
    ring: Vec<u32>,
    hash_map: HashMap<u32, String>,
}

/// Maps cache keys to peer identities via consistent hashing.
pub struct HashRing {
    num_virtual_nodes: usize,
    hash_fn: Box<dyn Fn(&[u8]) -> u32 + Send + Sync>,
    state: RwLock<RingState>,
}

impl HashRing {
    /// Creates an empty ring with `num_virtual_nodes` points per peer, using
    /// CRC-32/IEEE as the hash function.
    #[must_use]
    pub fn new(num_virtual_nodes: usize) -> Self {
        Self::with_hash(num_virtual_nodes, crc32_ieee)
    }

    /// Creates an empty ring with a custom hash function. Exposed mainly for
    /// tests that want a predictable, non-cryptographic mapping.
    pub fn with_hash(
        num_virtual_nodes: usize,
        hash_fn: impl Fn(&[u8]) -> u32 + Send + Sync + 'static,
    ) -> Self {
        Self {
            num_virtual_nodes,
            hash_fn: Box::new(hash_fn),
            state: RwLock::new(RingState {
                ring: Vec::new(),
                hash_map: HashMap::new(),
            }),
        }
    }

    /// Adds peers to the ring, inserting `num_virtual_nodes` synthetic
    /// points for each. Each point is hashed from the decimal virtual index
    /// concatenated with the peer id. Re-sorts once after all insertions.
    ///
    /// A hash collision between two peers' virtual points overwrites the
    /// earlier mapping; accepted per the ring's design, not treated as an
    /// error.
    pub fn add_peers<I, S>(&self, peers: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut state = self.state.write();
        for peer in peers {
            let peer_id = peer.into();
            for i in 0..self.num_virtual_nodes {
                let virtual_key = format!("{i}{peer_id}");
                let h = (self.hash_fn)(virtual_key.as_bytes());
                state.ring.push(h);
                state.hash_map.insert(h, peer_id.clone());
            }
        }
        state.ring.sort_unstable();
    }

    /// Routes `key` to a peer id. Returns `None` if the ring holds no
    /// peers.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        let state = self.state.read();
        if state.ring.is_empty() {
            return None;
        }
        let h = (self.hash_fn)(key.as_bytes());
        let idx = match state.ring.binary_search(&h) {
            Ok(i) | Err(i) => i,
        };
        let idx = if idx == state.ring.len() { 0 } else { idx };
        state.hash_map.get(&state.ring[idx]).cloned()
    }

    /// True if no peers have been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.read().ring.is_empty()
    }

    /// Number of distinct real peers currently on the ring.
    #[must_use]
    pub fn peer_count(&self) -> usize {
        let state = self.state.read();
        let mut ids: Vec<&String> = state.hash_map.values().collect();
        ids.sort_unstable();
        ids.dedup();
        ids.len()
    }
}

impl Default for HashRing {
    fn default() -> Self {
        Self::new(DEFAULT_VIRTUAL_NODES)
    }
}

impl fmt::Debug for HashRing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        f.debug_struct("HashRing")
            .field("num_virtual_nodes", &self.num_virtual_nodes)
            .field("ring_points", &state.ring.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_ring_misses_everything() {
        let ring = HashRing::new(50);
        assert_eq!(ring.get("Tom"), None);
    }

    #[test]
    fn routes_to_a_known_peer() {
        let ring = HashRing::new(50);
        ring.add_peers(["A", "B", "C"]);
        let peer = ring.get("Tom").expect("non-empty ring always routes");
        assert!(["A", "B", "C"].contains(&peer.as_str()));
    }

    #[test]
    fn s3_ring_determinism_across_insertion_order() {
        let forward = HashRing::new(50);
        forward.add_peers(["A", "B", "C"]);

        let backward = HashRing::new(50);
        backward.add_peers(["C", "B", "A"]);

        for key in ["Tom", "Jack", "Sam", "anything-else"] {
            assert_eq!(forward.get(key), backward.get(key), "key {key}");
        }
    }

    #[test]
    fn same_key_always_maps_to_same_peer() {
        let ring = HashRing::new(50);
        ring.add_peers(["A", "B", "C"]);
        let first = ring.get("Tom");
        for _ in 0..20 {
            assert_eq!(ring.get("Tom"), first);
        }
    }

    #[test]
    fn peer_count_reflects_distinct_real_peers() {
        let ring = HashRing::new(10);
        assert_eq!(ring.peer_count(), 0);
        ring.add_peers(["A", "B"]);
        assert_eq!(ring.peer_count(), 2);
    }
}
