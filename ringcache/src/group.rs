//! Cache group (C6): orchestrates local hit, peer fetch, and local load.
//!
//! Ties together the concurrent store (C2), an optional peer picker (C8),
//! and the single-flight coalescer (C5) behind a name that is unique within
//! a process (enforced by [`crate::registry`]).

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::concurrent::ConcurrentStore;
use crate::error::Error;
use crate::peer::{PeerGetter, PeerPicker};
use crate::singleflight::Coalescer;
use crate::value::ImmutableBytes;

/// Supplies authoritative data for a key not already cached.
///
/// Called at most once per concurrent burst for the same key (the
/// single-flight coalescer's job).
pub trait Loader: Send + Sync {
    /// Loads the bytes for `key`, or an error if the key does not exist or
    /// the underlying source failed.
    fn load(&self, key: &str) -> anyhow::Result<Vec<u8>>;
}

/// Adapts a plain closure to [`Loader`], mirroring the original's
/// function-to-interface `GetterFunc` adapter.
impl<F> Loader for F
where
    F: Fn(&str) -> anyhow::Result<Vec<u8>> + Send + Sync,
{
    fn load(&self, key: &str) -> anyhow::Result<Vec<u8>> {
        self(key)
    }
}

/// Result type for [`CacheGroup::get`]. The error is `Arc`-wrapped because
/// every joiner of a coalesced call observes the same failure (I5) and
/// [`Error`] itself isn't `Clone` — it wraps an opaque `anyhow::Error`.
pub type GetResult = Result<ImmutableBytes, Arc<Error>>;

/// A named cache backed by a loader, with optional peer routing.
pub struct CacheGroup {
    name: String,
    loader: Box<dyn Loader>,
    store: ConcurrentStore<String, ImmutableBytes>,
    peers: RwLock<Option<Arc<dyn PeerPicker>>>,
    coalescer: Coalescer<ImmutableBytes>,
}

impl CacheGroup {
    /// Creates a new, unregistered cache group.
    ///
    /// The original rejects a nil loader at construction; Rust's type
    /// system makes that case unrepresentable here, since `loader` must be
    /// a valid value of a type implementing [`Loader`]. See `DESIGN.md`.
    #[must_use]
    pub fn new(name: impl Into<String>, cache_bytes: u64, loader: impl Loader + 'static) -> Self {
        Self {
            name: name.into(),
            loader: Box::new(loader),
            store: ConcurrentStore::new(cache_bytes),
            peers: RwLock::new(None),
            coalescer: Coalescer::new(),
        }
    }

    /// The group's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registers a peer picker. May be called at most once; a second call
    /// is a programmer error.
    pub fn register_peers(&self, picker: Arc<dyn PeerPicker>) -> crate::error::Result<()> {
        let mut guard = self.peers.write();
        if guard.is_some() {
            return Err(Error::Misconfiguration(
                "RegisterPeers called twice on the same group".to_string(),
            ));
        }
        *guard = Some(picker);
        Ok(())
    }

    /// Looks up `key`: local hit, then (if a peer owns it) a remote fetch,
    /// falling back to the loader on any remote failure, all behind the
    /// single-flight coalescer so concurrent callers for the same key share
    /// one execution.
    pub fn get(&self, key: &str) -> GetResult {
        if key.is_empty() {
            return Err(Arc::new(Error::InvalidArgument));
        }

        if let Some(value) = self.store.get(&key.to_string()) {
            tracing::debug!(group = %self.name, key, "cache hit");
            return Ok(value);
        }

        tracing::debug!(group = %self.name, key, "cache miss, routing through coalescer");
        self.coalescer.do_call(key, || self.load(key))
    }

    fn load(&self, key: &str) -> crate::error::Result<ImmutableBytes> {
        let remote_peer = {
            let guard = self.peers.read();
            guard.as_ref().and_then(|picker| picker.pick_peer(key))
        };

        if let Some(peer) = remote_peer {
            match peer.get(&self.name, key) {
                Ok(bytes) => {
                    tracing::debug!(group = %self.name, key, "remote fetch succeeded");
                    // Remote results are not cached locally: the owning peer
                    // is authoritative, and caching would duplicate its
                    // memory budget.
                    return Ok(ImmutableBytes::from_owned(bytes));
                }
                Err(err) => {
                    tracing::warn!(
                        group = %self.name,
                        key,
                        error = %err,
                        "remote fetch failed, falling back to local loader"
                    );
                }
            }
        }

        let bytes = self
            .loader
            .load(key)
            .map_err(|err| Error::from_loader(key, err))?;
        let value = ImmutableBytes::from_owned(bytes);
        self.store.add(key.to_string(), value.clone());
        Ok(value)
    }
}

impl fmt::Debug for CacheGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheGroup")
            .field("name", &self.name)
            .field("has_peers", &self.peers.read().is_some())
            .finish_non_exhaustive()
    }
}
