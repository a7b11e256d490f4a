//! Store and retrieve files over a live HTTP server.

use std::sync::Arc;

use randomfs_integration_tests::{TestServer, test_data};
use randomfs_store::MemoryStore;
use randomfs_types::Locator;
use reqwest::StatusCode;
use reqwest::header;

#[tokio::test]
async fn test_small_text_file_roundtrip() {
    let server = TestServer::start(Arc::new(MemoryStore::new())).await;
    let data = b"hello, randomfs";

    let stored = server.store_ok("hello.txt", "text/plain", data).await;
    assert_eq!(stored.size, data.len() as u64);
    assert_eq!(stored.filename, "hello.txt");

    let locator = Locator::parse(&stored.url).unwrap();
    assert_eq!(locator.host, "randomfs");
    assert_eq!(locator.version, "v4");
    assert_eq!(locator.file_size, data.len() as u64);
    assert_eq!(locator.representation_id.as_str(), stored.hash);

    let response = server.retrieve(&stored.hash).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/plain");
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"hello.txt\""
    );
    assert_eq!(response.bytes().await.unwrap().as_ref(), data);

    server.stop().await;
}

#[tokio::test]
async fn test_locator_link_opens_inline() {
    let server = TestServer::start(Arc::new(MemoryStore::new())).await;
    let stored = server
        .store_ok("index.html", "text/html", b"<p>inline</p>")
        .await;

    let response = server.open(&stored.url).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "inline; filename=\"index.html\""
    );
    assert_eq!(response.bytes().await.unwrap().as_ref(), b"<p>inline</p>");

    server.stop().await;
}

#[tokio::test]
async fn test_medium_tier_file_spans_many_blocks() {
    let store = Arc::new(MemoryStore::new());
    let server = TestServer::start(store.clone()).await;

    // 2 MiB + 1 lands in the 64 KiB tier: 33 blocks plus one record.
    let data = test_data(2 * 1024 * 1024 + 1);
    let stored = server
        .store_ok("video.bin", "application/octet-stream", &data)
        .await;
    assert_eq!(store.len(), 34);

    let stats = server.stats().await;
    assert_eq!(stats["files_stored"], 1);
    assert_eq!(stats["blocks_generated"], 33);
    assert_eq!(stats["total_size"], data.len() as u64);

    let response = server.retrieve(&stored.hash).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_LENGTH],
        data.len().to_string()
    );
    assert_eq!(response.bytes().await.unwrap().as_ref(), data.as_slice());

    // Every block was cached at store time.
    let stats = server.stats().await;
    assert_eq!(stats["cache_hits"], 33);
    assert_eq!(stats["cache_misses"], 0);

    server.stop().await;
}

#[tokio::test]
async fn test_empty_file_roundtrip() {
    let server = TestServer::start(Arc::new(MemoryStore::new())).await;

    let stored = server.store_ok("empty", "text/plain", b"").await;
    assert_eq!(stored.size, 0);

    let response = server.retrieve(&stored.hash).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.bytes().await.unwrap().is_empty());

    let stats = server.stats().await;
    assert_eq!(stats["files_stored"], 1);
    assert_eq!(stats["blocks_generated"], 0);

    server.stop().await;
}

#[tokio::test]
async fn test_same_content_stored_twice_gets_distinct_blocks() {
    let store = Arc::new(MemoryStore::new());
    let server = TestServer::start(store.clone()).await;
    let data = test_data(3000);

    let first = server.store_ok("a.bin", "application/octet-stream", &data).await;
    let second = server.store_ok("a.bin", "application/octet-stream", &data).await;

    // Random padding makes every block unique: 3 blocks + 1 record, twice.
    assert_eq!(store.len(), 8);
    assert_ne!(first.hash, second.hash);

    for stored in [first, second] {
        let body = server.retrieve(&stored.hash).await.bytes().await.unwrap();
        assert_eq!(body.as_ref(), data.as_slice());
    }

    server.stop().await;
}

#[tokio::test]
async fn test_errors_are_json() {
    let server = TestServer::start(Arc::new(MemoryStore::new())).await;

    let response = server.retrieve("QmDoesNotExist").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json: serde_json::Value = response.json().await.unwrap();
    assert_eq!(json["success"], false);
    assert!(json["error"].is_string());

    let response = server.open("rd://randomfs/v4/1/a/1").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = server.get("/rd/%21%21%21").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    server.stop().await;
}

#[tokio::test]
async fn test_health_endpoint() {
    let server = TestServer::start(Arc::new(MemoryStore::new())).await;
    let json: serde_json::Value = server.get("/api/v1/health").await.json().await.unwrap();
    assert_eq!(json["status"], "healthy");
    server.stop().await;
}
