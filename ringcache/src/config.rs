//! Configuration structs for the cache engine.
//!
//! One struct per concern, each with a builder-style constructor and a
//! manual `Debug` impl, following the same convention as the rest of this
//! crate's per-module configuration.

pub mod group;
pub mod hash_ring;

pub use group::GroupConfig;
pub use hash_ring::HashRingConfig;
