//! Configuration for the consistent-hash ring.

use core::fmt;

use crate::hash_ring::DEFAULT_VIRTUAL_NODES;

/// Configuration for a [`crate::hash_ring::HashRing`].
///
/// # Examples
///
/// ```
/// use ringcache::config::HashRingConfig;
///
/// let config = HashRingConfig::new(100);
/// assert_eq!(config.num_virtual_nodes(), 100);
///
/// let default_config = HashRingConfig::default();
/// assert_eq!(default_config.num_virtual_nodes(), 50);
/// ```
#[derive(Clone, Copy)]
pub struct HashRingConfig {
    num_virtual_nodes: usize,
}

impl HashRingConfig {
    /// Creates a configuration with the given virtual-node multiplier.
    #[must_use]
    pub fn new(num_virtual_nodes: usize) -> Self {
        Self { num_virtual_nodes }
    }

    /// The number of synthetic ring points each real peer contributes.
    #[must_use]
    pub fn num_virtual_nodes(&self) -> usize {
        self.num_virtual_nodes
    }
}

impl Default for HashRingConfig {
    fn default() -> Self {
        Self::new(DEFAULT_VIRTUAL_NODES)
    }
}

impl fmt::Debug for HashRingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashRingConfig")
            .field("num_virtual_nodes", &self.num_virtual_nodes)
            .finish()
    }
}
