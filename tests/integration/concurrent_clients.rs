//! Many clients hitting one server over a store with latency.

use std::sync::Arc;

use ntest::timeout;
use randomfs_integration_tests::{TestServer, test_data};
use randomfs_store::{MemoryStore, SlowStore};
use reqwest::StatusCode;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[timeout(60000)]
async fn test_parallel_uploads_and_downloads() {
    let store = SlowStore::new(Arc::new(MemoryStore::new()))
        .read_latency(0, 3)
        .write_latency(0, 3)
        .seed(7);
    let server = Arc::new(TestServer::start(Arc::new(store)).await);

    let mut tasks = Vec::new();
    for i in 0..16usize {
        let server = server.clone();
        tasks.push(tokio::spawn(async move {
            let data = test_data(1000 + i * 977);
            let name = format!("client-{i}.bin");
            let stored = server
                .store_ok(&name, "application/octet-stream", &data)
                .await;
            let response = server.retrieve(&stored.hash).await;
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(response.bytes().await.unwrap().as_ref(), data.as_slice());
            data.len() as u64
        }));
    }

    let mut total = 0;
    for task in tasks {
        total += task.await.unwrap();
    }

    let stats = server.stats().await;
    assert_eq!(stats["files_stored"], 16);
    assert_eq!(stats["total_size"], total);

    let server = Arc::into_inner(server).expect("all clients finished");
    server.stop().await;
}
