//! Reference ringcache node: serves one cache group ("scores") backed by an
//! in-memory database, over HTTP, optionally peered with other nodes
//! addressed via `--peers`.
//!
//! ```text
//! cargo run --bin ringcache-node -- --self-addr 127.0.0.1:8001 \
//!     --peers 127.0.0.1:8001,127.0.0.1:8002,127.0.0.1:8003
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use clap::Parser;
use ringcache_transport::{HttpPeerPicker, HttpPool};

#[derive(Parser, Debug)]
#[command(name = "ringcache-node", about = "Reference ringcache HTTP node")]
struct Args {
    /// Address this node listens on and is addressed as by peers.
    #[arg(long, default_value = "127.0.0.1:8001")]
    self_addr: String,

    /// Comma-separated addresses of every node in the cluster, this one
    /// included. Omit to run standalone with no peer fallback.
    #[arg(long, value_delimiter = ',')]
    peers: Vec<String>,

    /// Route prefix the cache is served under.
    #[arg(long, default_value = "/microCache/")]
    prefix: String,

    /// Maximum bytes the local "scores" group may hold.
    #[arg(long, default_value_t = 1 << 20)]
    cache_bytes: u64,
}

fn seed_database() -> HashMap<&'static str, &'static str> {
    HashMap::from([("Tom", "630"), ("Jack", "589"), ("Sam", "567")])
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let db = seed_database();

    let group = ringcache::new_cache_group(
        "scores",
        args.cache_bytes,
        move |key: &str| match db.get(key) {
            Some(value) => Ok(value.as_bytes().to_vec()),
            None => Err(anyhow::anyhow!("{key} not exist")),
        },
    )?;

    if !args.peers.is_empty() {
        let picker = Arc::new(HttpPeerPicker::new(args.self_addr.clone(), args.prefix.clone()));
        picker.set_peers(args.peers.clone());
        group.register_peers(picker)?;
        tracing::info!(peers = ?args.peers, "peer set configured");
    }

    let pool = HttpPool::new(args.prefix.clone())?;
    let listener = tokio::net::TcpListener::bind(&args.self_addr).await?;
    tracing::info!(addr = %args.self_addr, prefix = %args.prefix, "ringcache node listening");
    axum::serve(listener, pool.into_router()).await?;
    Ok(())
}
