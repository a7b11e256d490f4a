//! Behavior while the content store is unreachable.

use std::sync::Arc;

use randomfs_engine::RandomFsConfig;
use randomfs_integration_tests::{OutageStore, TestServer, test_data};
use randomfs_store::MemoryStore;
use reqwest::StatusCode;

#[tokio::test]
async fn test_store_during_outage_is_bad_gateway_and_not_counted() {
    let store = Arc::new(OutageStore::new(Arc::new(MemoryStore::new())));
    let server = TestServer::start(store.clone()).await;

    store.set_down(true);
    let response = server.store("a.txt", "text/plain", b"payload").await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json: serde_json::Value = response.json().await.unwrap();
    assert_eq!(json["success"], false);

    let stats = server.stats().await;
    assert_eq!(stats["files_stored"], 0);
    assert_eq!(stats["blocks_generated"], 0);

    store.set_down(false);
    let stored = server.store_ok("a.txt", "text/plain", b"payload").await;
    let body = server.retrieve(&stored.hash).await.bytes().await.unwrap();
    assert_eq!(body.as_ref(), b"payload");

    server.stop().await;
}

#[tokio::test]
async fn test_record_fetch_during_outage_is_bad_gateway() {
    let store = Arc::new(OutageStore::new(Arc::new(MemoryStore::new())));
    let server = TestServer::start(store.clone()).await;
    let stored = server.store_ok("a.txt", "text/plain", b"payload").await;

    store.set_down(true);
    let response = server.retrieve(&stored.hash).await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    store.set_down(false);
    let response = server.retrieve(&stored.hash).await;
    assert_eq!(response.status(), StatusCode::OK);

    server.stop().await;
}

#[tokio::test]
async fn test_tiny_cache_still_reconstructs_after_outage() {
    let store = Arc::new(OutageStore::new(Arc::new(MemoryStore::new())));
    let config = RandomFsConfig {
        cache_max_bytes: 4 * 1024,
        ..RandomFsConfig::default()
    };
    let server = TestServer::start_with(config, store.clone()).await;

    // 40 blocks against a 4 KiB cache: most must come back from the store.
    let data = test_data(40 * 1024);
    let stored = server
        .store_ok("big.bin", "application/octet-stream", &data)
        .await;
    assert!(server.engine.cache().used_bytes() <= 4 * 1024);

    store.set_down(true);
    let response = server.retrieve(&stored.hash).await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    store.set_down(false);
    let body = server.retrieve(&stored.hash).await.bytes().await.unwrap();
    assert_eq!(body.as_ref(), data.as_slice());

    let stats = server.stats().await;
    assert!(stats["cache_misses"].as_u64().unwrap() >= 36);

    server.stop().await;
}
