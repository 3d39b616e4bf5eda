//! Reference HTTP transport for ringcache.
//!
//! This crate is deliberately kept separate from `ringcache` itself: the
//! core engine has no opinion on wire format or networking, and linking it
//! in would force every consumer embedding the cache as a library to pull
//! in `axum`/`tokio`/`reqwest`. Everything here is example plumbing that
//! wires [`ringcache::CacheGroup`] up to HTTP, the way the node in
//! `src/main.rs` does.
//!
//! ```text
//! client --GET {prefix}/{group}/{key}--> HttpPool --> CacheGroup::get
//!                                                        |
//!                                                        v
//!                                            HttpPeerPicker -> HttpPeerClient --> peer node
//! ```

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use axum::extract::{Path as AxumPath, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use percent_encoding::{percent_decode_str, utf8_percent_encode, NON_ALPHANUMERIC};
use ringcache::{CacheGroup, PeerGetter, PeerPicker};

/// HTTP-facing router wrapping registered cache groups.
///
/// Routes `GET {prefix}{group}/{key}` to `CacheGroup::get`, translating the
/// result into the status codes a caller of the node expects: 200 with the
/// raw value on a hit, 404 for an unknown group, 400 for a malformed path,
/// 500 for any failure surfaced by the loader or a peer.
#[derive(Clone)]
pub struct HttpPool {
    prefix: String,
}

impl HttpPool {
    /// Builds a pool serving under `prefix` (e.g. `"/microCache/"`).
    ///
    /// `prefix` must start and end with `/`; anything else is a
    /// misconfiguration caught here rather than at request time.
    pub fn new(prefix: impl Into<String>) -> ringcache::Result<Self> {
        let prefix = prefix.into();
        if !prefix.starts_with('/') || !prefix.ends_with('/') {
            return Err(ringcache::Error::Misconfiguration(format!(
                "prefix {prefix:?} must start and end with '/'"
            )));
        }
        Ok(Self { prefix })
    }

    /// Turns this pool into an `axum` [`Router`] ready to be served.
    pub fn into_router(self) -> Router {
        // axum 0.7's route matcher uses `*name` for a wildcard tail, not the
        // `{*name}` brace syntax introduced in 0.8.
        let pattern = format!("{}*rest", self.prefix);
        Router::new()
            .route(&pattern, get(handle_get))
            .with_state(Arc::new(self))
    }
}

impl std::fmt::Debug for HttpPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpPool").field("prefix", &self.prefix).finish()
    }
}

async fn handle_get(State(_pool): State<Arc<HttpPool>>, AxumPath(rest): AxumPath<String>) -> Response {
    let segments: Vec<&str> = rest.split('/').collect();
    if segments.len() != 2 || segments[0].is_empty() || segments[1].is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            "malformed path: expected {group}/{key}".to_string(),
        )
            .into_response();
    }

    let group_name = decode_segment(segments[0]);
    let key = decode_segment(segments[1]);

    let Some(group) = ringcache::get_cache_group(&group_name) else {
        return (StatusCode::NOT_FOUND, format!("no such group: {group_name}")).into_response();
    };

    match tokio::task::spawn_blocking(move || group.get(&key)).await {
        Ok(Ok(value)) => (
            [(header::CONTENT_TYPE, "application/octet-stream")],
            value.as_bytes(),
        )
            .into_response(),
        Ok(Err(err)) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response(),
        Err(join_err) => (StatusCode::INTERNAL_SERVER_ERROR, join_err.to_string()).into_response(),
    }
}

fn decode_segment(segment: &str) -> String {
    percent_decode_str(segment).decode_utf8_lossy().into_owned()
}

fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, NON_ALPHANUMERIC).to_string()
}

/// [`PeerGetter`] that fetches a key from one remote node over HTTP.
pub struct HttpPeerClient {
    base_url: String,
    prefix: String,
    client: reqwest::blocking::Client,
}

impl HttpPeerClient {
    pub fn new(base_url: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            prefix: prefix.into(),
            client: reqwest::blocking::Client::new(),
        }
    }
}

impl std::fmt::Debug for HttpPeerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpPeerClient")
            .field("base_url", &self.base_url)
            .field("prefix", &self.prefix)
            .finish()
    }
}

impl PeerGetter for HttpPeerClient {
    fn get(&self, group: &str, key: &str) -> anyhow::Result<Vec<u8>> {
        let url = format!(
            "{}{}{}/{}",
            self.base_url,
            self.prefix,
            encode_segment(group),
            encode_segment(key)
        );
        let response = self.client.get(&url).send()?;
        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("peer {} returned {status}", self.base_url);
        }
        Ok(response.bytes()?.to_vec())
    }
}

/// [`PeerPicker`] backed by a [`ringcache::HashRing`], routing to
/// [`HttpPeerClient`]s for every peer that isn't this node.
pub struct HttpPeerPicker {
    self_addr: String,
    prefix: String,
    ring: ringcache::HashRing,
    peer_addrs: RwLock<HashMap<String, ()>>,
}

impl HttpPeerPicker {
    pub fn new(self_addr: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            self_addr: self_addr.into(),
            prefix: prefix.into(),
            ring: ringcache::HashRing::default(),
            peer_addrs: RwLock::new(HashMap::new()),
        }
    }

    /// Replaces the peer set. `addrs` should include every node in the
    /// cluster, this node's own address included, so that routing decisions
    /// agree across the cluster regardless of who's asking.
    pub fn set_peers<I, S>(&self, addrs: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let addrs: Vec<String> = addrs.into_iter().map(Into::into).collect();
        self.ring.add_peers(addrs.iter().cloned());
        let mut known = self.peer_addrs.write().unwrap();
        known.clear();
        known.extend(addrs.into_iter().map(|addr| (addr, ())));
    }
}

impl std::fmt::Debug for HttpPeerPicker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpPeerPicker")
            .field("self_addr", &self.self_addr)
            .field("peer_count", &self.ring.peer_count())
            .finish()
    }
}

impl PeerPicker for HttpPeerPicker {
    fn pick_peer(&self, key: &str) -> Option<Box<dyn PeerGetter>> {
        let peer_addr = self.ring.get(key)?;
        if peer_addr == self.self_addr {
            return None;
        }
        Some(Box::new(HttpPeerClient::new(
            format!("http://{peer_addr}"),
            self.prefix.clone(),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_rejects_prefix_without_leading_slash() {
        assert!(HttpPool::new("microCache/").is_err());
    }

    #[test]
    fn pool_rejects_prefix_without_trailing_slash() {
        assert!(HttpPool::new("/microCache").is_err());
    }

    #[test]
    fn pool_accepts_well_formed_prefix() {
        assert!(HttpPool::new("/microCache/").is_ok());
    }

    #[test]
    fn picker_routes_self_address_to_none() {
        let picker = HttpPeerPicker::new("10.0.0.1:8001", "/microCache/");
        picker.set_peers(["10.0.0.1:8001", "10.0.0.2:8001", "10.0.0.3:8001"]);
        // whichever key routes to us locally, pick_peer must say "local"
        let mut saw_local = false;
        for key in ["Tom", "Jack", "Sam", "Eve", "Ann"] {
            if picker.pick_peer(key).is_none() {
                saw_local = true;
            }
        }
        assert!(saw_local || picker.ring.peer_count() == 3);
    }

    #[test]
    fn decode_segment_round_trips_percent_encoding() {
        assert_eq!(decode_segment("a%20b"), "a b");
        assert_eq!(encode_segment("a b"), "a%20b");
    }
}
