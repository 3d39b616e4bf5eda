//! Error types for the cache engine.
//!
//! Mirrors the error *kinds* the engine can produce, not a specific
//! transport's wire format: a peer or HTTP layer is expected to map these
//! onto its own status codes.

use thiserror::Error;

/// Result type alias for `ringcache` operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the cache engine.
#[derive(Error, Debug)]
pub enum Error {
    /// An empty key was passed to `CacheGroup::get`.
    #[error("key required")]
    InvalidArgument,

    /// The loader reported that the key has no value (not a failure of the
    /// loader itself).
    #[error("key not found: {0}")]
    NotFound(String),

    /// The loader failed for a reason other than absence of the key.
    #[error("loader failed: {0}")]
    LoaderFailure(#[source] anyhow::Error),

    /// A remote peer fetch failed. Never surfaced directly to a caller of
    /// `CacheGroup::get` — it is recovered by falling through to the local
    /// loader (see §4.6) — but kept so callers can log the fallback reason.
    #[error("peer fetch failed: {0}")]
    PeerFailure(#[source] anyhow::Error),

    /// Programmer error: nil loader, double `RegisterPeers`, duplicate group
    /// registration, or a transport request outside its configured prefix.
    #[error("misconfiguration: {0}")]
    Misconfiguration(String),
}

impl Error {
    /// Classifies a loader error as [`Error::NotFound`] if its message looks
    /// like an absence report (the convention the original data source uses:
    /// `"<key> not exist"`), otherwise wraps it as [`Error::LoaderFailure`].
    pub(crate) fn from_loader(key: &str, err: anyhow::Error) -> Self {
        if err.to_string().contains("not exist") || err.to_string().contains("not found") {
            Self::NotFound(key.to_string())
        } else {
            Self::LoaderFailure(err)
        }
    }
}
