//! Exercises the literal HTTP surface (S6): a known key round-trips as raw
//! bytes with the right content type, an unknown group is a 404, a
//! malformed path is a 400, and a key the loader can't find is a 500.

use std::net::TcpListener as StdTcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use ringcache_transport::HttpPool;

fn unique_name(tag: &str) -> String {
    static COUNTER: AtomicUsize = AtomicUsize::new(0);
    format!("{tag}-{}", COUNTER.fetch_add(1, Ordering::SeqCst))
}

/// Boots one node on an ephemeral port in a background thread and returns
/// its base URL once the listener is up.
fn spawn_server() -> String {
    let std_listener = StdTcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    thread::spawn(move || {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        runtime.block_on(async move {
            std_listener.set_nonblocking(true).unwrap();
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            let pool = HttpPool::new("/microCache/").unwrap();
            axum::serve(listener, pool.into_router()).await.unwrap();
        });
    });
    thread::sleep(Duration::from_millis(150));
    format!("http://{addr}")
}

#[test]
fn s6_known_key_returns_200_with_raw_bytes() {
    let base = spawn_server();
    let name = unique_name("s6-hit");
    ringcache::new_cache_group(name.clone(), 1 << 16, |key: &str| match key {
        "Tom" => Ok(b"630".to_vec()),
        _ => Err(anyhow::anyhow!("{key} not exist")),
    })
    .unwrap();

    let client = reqwest::blocking::Client::new();
    let response = client
        .get(format!("{base}/microCache/{name}/Tom"))
        .send()
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .unwrap(),
        "application/octet-stream"
    );
    assert_eq!(response.bytes().unwrap().as_ref(), b"630");
}

#[test]
fn s6_unknown_group_returns_404() {
    let base = spawn_server();
    let client = reqwest::blocking::Client::new();
    let response = client
        .get(format!("{base}/microCache/no-such-group/Tom"))
        .send()
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
}

#[test]
fn s6_missing_key_segment_returns_400() {
    let base = spawn_server();
    let name = unique_name("s6-malformed");
    ringcache::new_cache_group(name.clone(), 1024, |_: &str| Ok(b"x".to_vec())).unwrap();

    let client = reqwest::blocking::Client::new();
    let response = client
        .get(format!("{base}/microCache/{name}"))
        .send()
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
}

#[test]
fn s6_empty_key_returns_400() {
    let base = spawn_server();
    let name = unique_name("s6-empty-key");
    ringcache::new_cache_group(name.clone(), 1024, |_: &str| Ok(b"x".to_vec())).unwrap();

    let client = reqwest::blocking::Client::new();
    let response = client
        .get(format!("{base}/microCache/{name}/"))
        .send()
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
}

#[test]
fn s6_loader_miss_returns_500() {
    let base = spawn_server();
    let name = unique_name("s6-miss");
    ringcache::new_cache_group(name.clone(), 1024, |key: &str| {
        Err(anyhow::anyhow!("{key} not exist"))
    })
    .unwrap();

    let client = reqwest::blocking::Client::new();
    let response = client
        .get(format!("{base}/microCache/{name}/Nobody"))
        .send()
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);
}
