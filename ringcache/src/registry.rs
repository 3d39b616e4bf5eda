//! Process-wide cache group registry (C7).
//!
//! A single reader-writer lock over a name → group map. Registration is
//! rare and rejects a duplicate name rather than silently replacing it —
//! see `DESIGN.md` for why this diverges from the source's silent-overwrite
//! behavior.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;

use crate::error::Error;
use crate::group::{CacheGroup, Loader};

fn registry() -> &'static RwLock<HashMap<String, Arc<CacheGroup>>> {
    static REGISTRY: OnceLock<RwLock<HashMap<String, Arc<CacheGroup>>>> = OnceLock::new();
    REGISTRY.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Creates a cache group and registers it under `name`.
///
/// Fails with [`Error::Misconfiguration`] if a group with that name is
/// already registered.
pub fn new_cache_group(
    name: impl Into<String>,
    cache_bytes: u64,
    loader: impl Loader + 'static,
) -> crate::error::Result<Arc<CacheGroup>> {
    let name = name.into();
    let mut groups = registry().write();
    if groups.contains_key(&name) {
        return Err(Error::Misconfiguration(format!(
            "cache group {name:?} is already registered"
        )));
    }
    let group = Arc::new(CacheGroup::new(name.clone(), cache_bytes, loader));
    groups.insert(name, Arc::clone(&group));
    Ok(group)
}

/// Looks up a registered group by name.
#[must_use]
pub fn get_cache_group(name: &str) -> Option<Arc<CacheGroup>> {
    registry().read().get(name).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    // The registry is process-wide `static` state, so tests share it; give
    // each test a unique name to avoid cross-test interference.
    fn unique_name(tag: &str) -> String {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        format!("{tag}-{}", COUNTER.fetch_add(1, Ordering::SeqCst))
    }

    #[test]
    fn s7_registered_group_is_discoverable() {
        let name = unique_name("scores");
        let created = new_cache_group(name.clone(), 1024, |_: &str| Ok(b"x".to_vec())).unwrap();
        let found = get_cache_group(&name).unwrap();
        assert_eq!(found.name(), created.name());
    }

    #[test]
    fn unknown_name_is_absent() {
        assert!(get_cache_group(&unique_name("never-registered")).is_none());
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let name = unique_name("dup");
        new_cache_group(name.clone(), 1024, |_: &str| Ok(b"x".to_vec())).unwrap();
        let err = new_cache_group(name, 1024, |_: &str| Ok(b"y".to_vec())).unwrap_err();
        assert!(matches!(err, Error::Misconfiguration(_)));
    }
}
