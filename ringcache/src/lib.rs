//! A distributed in-memory key→bytes cache, arranged as a peer group.
//!
//! Each peer owns a shard of the keyspace determined by consistent hashing.
//! On a miss, a peer either forwards the request to the authoritative peer
//! or invokes a caller-supplied [`group::Loader`], deduplicating concurrent
//! loads of the same key. Evictions honor a per-peer memory budget via an
//! LRU policy.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                         CacheGroup::get(key)                      │
//! │                                                                   │
//! │  ConcurrentStore (C2)                                             │
//! │  ┌──────────────┐  hit                                            │
//! │  │ LruStore (C1)│─────────────▶ return value                      │
//! │  └──────┬───────┘                                                 │
//! │         │ miss                                                    │
//! │         ▼                                                         │
//! │  Coalescer::do_call(key) (C5) ── at most one producer in flight ──│
//! │         │                                                         │
//! │         ▼                                                         │
//! │  PeerPicker::pick_peer(key) (C8, via HashRing C4)                 │
//! │   ├─ Some(remote) ──▶ remote.get() ──ok──▶ return (not cached)    │
//! │   │                        └─err──▶ fall through ↓                │
//! │   └─ None ───────────────────────────────────────▶ Loader::load() │
//! │                                                      │ ok: cache   │
//! │                                                      ▼ it, return  │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Responsibility |
//! |--------|---------------|
//! | [`lru`] | bounded, byte-accounted LRU store |
//! | [`concurrent`] | single-mutex, lazily-initialized wrapper over [`lru`] |
//! | [`value`] | defensively-copied immutable byte values |
//! | [`hash_ring`] | consistent-hash peer routing with virtual nodes |
//! | [`singleflight`] | call coalescing / cache-breakdown protection |
//! | [`group`] | ties a loader, store, peer picker and coalescer together |
//! | [`registry`] | process-wide named-group directory |
//! | [`peer`] | abstract peer transport contracts |
//! | [`config`] | per-concern configuration structs |
//! | [`error`] | error kinds surfaced by the engine |
//!
//! This crate has no networking or transport of its own. See the separate
//! `ringcache-transport` crate for a reference HTTP implementation of the
//! [`peer`] contracts.

pub mod concurrent;
pub mod config;
pub mod error;
pub mod group;
pub mod hash_ring;
pub mod lru;
pub mod peer;
pub mod registry;
pub mod singleflight;
pub mod value;

pub use error::{Error, Result};
pub use group::{CacheGroup, GetResult, Loader};
pub use hash_ring::HashRing;
pub use peer::{PeerGetter, PeerPicker};
pub use registry::{get_cache_group, new_cache_group};
pub use value::ImmutableBytes;
