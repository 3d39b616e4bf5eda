//! Configuration for a cache group's byte budget.

use core::fmt;

/// Configuration for a [`crate::group::CacheGroup`].
///
/// # Examples
///
/// ```
/// use ringcache::config::GroupConfig;
///
/// let config = GroupConfig::new("scores", 64 * 1024 * 1024);
/// assert_eq!(config.name(), "scores");
/// assert_eq!(config.cache_bytes(), 64 * 1024 * 1024);
/// ```
#[derive(Clone)]
pub struct GroupConfig {
    name: String,
    cache_bytes: u64,
}

impl GroupConfig {
    /// Creates a configuration for a group named `name` with the given byte
    /// budget. `cache_bytes == 0` means unbounded, matching
    /// [`crate::lru::LruStore`]'s `max_memory` convention.
    #[must_use]
    pub fn new(name: impl Into<String>, cache_bytes: u64) -> Self {
        Self {
            name: name.into(),
            cache_bytes,
        }
    }

    /// The group's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The group's byte budget.
    #[must_use]
    pub fn cache_bytes(&self) -> u64 {
        self.cache_bytes
    }
}

impl fmt::Debug for GroupConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupConfig")
            .field("name", &self.name)
            .field("cache_bytes", &self.cache_bytes)
            .finish()
    }
}
