//! Abstract peer contracts (C8): the two interfaces a transport implements.
//!
//! The core depends only on these traits, never on a concrete transport —
//! the reference HTTP implementation lives in the separate
//! `ringcache-transport` crate.

/// Routes a key to the peer that owns it.
pub trait PeerPicker: Send + Sync {
    /// Picks the owner of `key`.
    ///
    /// Returns `None` when this node owns the key itself (load locally);
    /// `Some(getter)` when a remote peer should be consulted first.
    /// Implementations are expected to compare the routed peer id against
    /// the node's own id and return `None` when they match.
    fn pick_peer(&self, key: &str) -> Option<Box<dyn PeerGetter>>;
}

/// Fetches a key's value from the peer that owns it.
pub trait PeerGetter: Send + Sync {
    /// Returns the owner's current bytes for `key` in `group`, or an error
    /// if the owner is unreachable or reports failure. The returned buffer
    /// is owned by the caller.
    fn get(&self, group: &str, key: &str) -> anyhow::Result<Vec<u8>>;
}
