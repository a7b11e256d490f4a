//! Files stored on a directory-backed store outlive the server process.

use std::sync::Arc;

use randomfs_engine::{RandomFs, RandomFsConfig};
use randomfs_integration_tests::{TestServer, test_data};
use randomfs_store::FileStore;
use randomfs_types::Locator;
use reqwest::StatusCode;

#[tokio::test]
async fn test_restart_serves_previously_stored_files() {
    let dir = tempfile::tempdir().unwrap();
    let data = test_data(100_000);

    let server = TestServer::start(Arc::new(FileStore::new(dir.path()).unwrap())).await;
    let stored = server.store_ok("notes.md", "text/markdown", &data).await;
    server.stop().await;

    // Fresh process, cold cache, same directory.
    let server = TestServer::start(Arc::new(FileStore::new(dir.path()).unwrap())).await;
    let response = server.open(&stored.url).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[reqwest::header::CONTENT_TYPE],
        "text/markdown"
    );
    assert_eq!(response.bytes().await.unwrap().as_ref(), data.as_slice());

    // 100_000 bytes in 1 KiB blocks: every block missed the cache once.
    let stats = server.stats().await;
    assert_eq!(stats["cache_misses"], 98);
    assert_eq!(stats["cache_hits"], 0);
    assert_eq!(stats["files_stored"], 0);

    // A second read is served from the cache.
    server.retrieve(&stored.hash).await.bytes().await.unwrap();
    let stats = server.stats().await;
    assert_eq!(stats["cache_hits"], 98);

    server.stop().await;
}

#[tokio::test]
async fn test_two_instances_share_a_directory() {
    let dir = tempfile::tempdir().unwrap();
    let writer = RandomFs::new(
        RandomFsConfig::default(),
        Arc::new(FileStore::new(dir.path()).unwrap()),
    )
    .unwrap();
    let reader = RandomFs::new(
        RandomFsConfig {
            host: "mirror".to_string(),
            ..RandomFsConfig::default()
        },
        Arc::new(FileStore::new(dir.path()).unwrap()),
    )
    .unwrap();

    let data = test_data(5000);
    let locator = writer
        .store_file("shared.bin", &data, "application/octet-stream")
        .await
        .unwrap();

    // The locator text is all a second instance needs.
    let parsed: Locator = locator.to_string().parse().unwrap();
    let (out, rep) = reader
        .retrieve_file(&parsed.representation_id)
        .await
        .unwrap();
    assert_eq!(out, data);
    assert_eq!(rep.filename, "shared.bin");
    assert_eq!(rep.block_ids.len(), 5);
}

#[tokio::test]
async fn test_missing_block_file_fails_reconstruction() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileStore::new(dir.path()).unwrap());
    let writer = RandomFs::new(RandomFsConfig::default(), store.clone()).unwrap();

    let locator = writer
        .store_file("gone.bin", &test_data(4096), "application/octet-stream")
        .await
        .unwrap();
    let (_, rep) = writer
        .retrieve_file(&locator.representation_id)
        .await
        .unwrap();

    // Delete one block behind the engine's back, then read on a cold instance.
    let victim = rep.block_ids[2].as_str();
    let path = dir.path().join(&victim[..2]).join(&victim[2..4]).join(victim);
    std::fs::remove_file(&path).unwrap();

    let server = TestServer::start(store).await;
    let response = server.retrieve(locator.representation_id.as_str()).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json: serde_json::Value = response.json().await.unwrap();
    assert!(json["error"].as_str().unwrap().contains("reconstruction"));

    server.stop().await;
}
