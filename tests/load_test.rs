//! Concurrency and load tests for the indexer client.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::json;

use indexer_client::{IndexerClient, Variables};

mod common;

const QUERY: &str = "query($first: Int) { pools(first: $first) { id } }";

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_identical_requests_hit_backend_once() {
    let hits = Arc::new(AtomicU32::new(0));
    let h = hits.clone();
    let addr = common::start_programmable_backend(move |_| {
        h.fetch_add(1, Ordering::SeqCst);
        async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            (200, r#"{"data":{"pools":[{"id":"0xpool"}]}}"#.to_string())
        }
    })
    .await;

    let client = IndexerClient::new(&common::test_config(vec![common::graphql_url(addr)])).unwrap();

    let concurrency = 50;
    let mut handles = Vec::with_capacity(concurrency);
    for _ in 0..concurrency {
        let client = client.clone();
        handles.push(tokio::spawn(async move {
            client.request(QUERY, Variables::new().set("first", 1), 5_000).await
        }));
    }

    for handle in handles {
        let data = handle.await.unwrap().unwrap();
        assert_eq!(data, json!({"pools": [{"id": "0xpool"}]}));
    }

    assert_eq!(hits.load(Ordering::SeqCst), 1, "identical requests should coalesce");
    assert_eq!(client.in_flight(), 0);
    assert_eq!(client.cached_entries(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_distinct_requests_are_not_coalesced() {
    let hits = Arc::new(AtomicU32::new(0));
    let h = hits.clone();
    let addr = common::start_programmable_backend(move |_| {
        h.fetch_add(1, Ordering::SeqCst);
        async { (200, r#"{"data":{"pools":[]}}"#.to_string()) }
    })
    .await;

    let client = IndexerClient::new(&common::test_config(vec![common::graphql_url(addr)])).unwrap();

    let calls = (0..20).map(|n| {
        let client = client.clone();
        async move { client.request(QUERY, Variables::new().set("first", n), 5_000).await }
    });
    let results = futures_util::future::join_all(calls).await;

    assert!(results.iter().all(|r| r.is_ok()));
    assert_eq!(hits.load(Ordering::SeqCst), 20);
    assert_eq!(client.cached_entries(), 20);
}

#[tokio::test]
async fn test_cache_freshness_over_http() {
    let hits = Arc::new(AtomicU32::new(0));
    let h = hits.clone();
    let addr = common::start_programmable_backend(move |_| {
        let n = h.fetch_add(1, Ordering::SeqCst);
        async move { (200, format!(r#"{{"data":{{"version":{}}}}}"#, n)) }
    })
    .await;

    let client = IndexerClient::new(&common::test_config(vec![common::graphql_url(addr)])).unwrap();

    let first = client.request(QUERY, Variables::new(), 300).await.unwrap();
    let cached = client.request(QUERY, Variables::new(), 300).await.unwrap();
    assert_eq!(first, json!({"version": 0}));
    assert_eq!(cached, first);
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    tokio::time::sleep(Duration::from_millis(400)).await;

    let refreshed = client.request(QUERY, Variables::new(), 300).await.unwrap();
    assert_eq!(refreshed, json!({"version": 1}));
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_limiter_burst_then_throttle() {
    let addr = common::start_mock_backend("{}").await;

    let mut config = common::test_config(vec![common::graphql_url(addr)]);
    config.rate_limit.enabled = true;
    config.rate_limit.burst_size = 6;
    config.rate_limit.requests_per_second = 4.0;
    let client = IndexerClient::new(&config).unwrap();

    let start = Instant::now();
    let calls = (0..8).map(|n| {
        let client = client.clone();
        async move {
            client.request(QUERY, Variables::new().set("first", n), 0).await.unwrap();
            start.elapsed()
        }
    });
    let mut finished = futures_util::future::join_all(calls).await;
    finished.sort();

    // Six tokens up front, then one every 250ms.
    assert!(finished[5] < Duration::from_millis(200), "burst throttled: {:?}", finished);
    assert!(finished[6] >= Duration::from_millis(240), "7th not throttled: {:?}", finished);
    assert!(finished[7] >= Duration::from_millis(490), "8th not throttled: {:?}", finished);
    assert!(finished[7] < Duration::from_millis(1500), "throttled too long: {:?}", finished);
}
