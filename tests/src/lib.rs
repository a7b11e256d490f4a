//! Shared test harness for RandomFS integration tests.
//!
//! Provides [`TestServer`]: a real HTTP server on a loopback port, backed
//! by a [`RandomFs`] instance over any [`ContentStore`], driven through
//! `reqwest` the way a browser or script would.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use bytes::Bytes;
use randomfs_engine::{RandomFs, RandomFsConfig};
use randomfs_http::{HttpServer, HttpServerConfig};
use randomfs_store::{ContentStore, StoreError};
use randomfs_types::ContentId;
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Generate deterministic, non-repeating test data.
pub fn test_data(size: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(size);
    let mut state: u32 = 0xDEAD_BEEF;
    for _ in 0..size {
        state = state.wrapping_mul(1103515245).wrapping_add(12345);
        data.push((state >> 16) as u8);
    }
    data
}

// =========================================================================
// Test server
// =========================================================================

/// Fields of a successful `POST /api/v1/store` reply.
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub url: String,
    pub hash: String,
    pub size: u64,
    pub filename: String,
}

/// A RandomFS HTTP server running on `127.0.0.1` with an ephemeral port.
pub struct TestServer {
    pub engine: Arc<RandomFs>,
    base_url: String,
    client: reqwest::Client,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<std::io::Result<()>>>,
}

impl TestServer {
    /// Start a server with default settings over `store`.
    pub async fn start(store: Arc<dyn ContentStore>) -> Self {
        Self::start_with(RandomFsConfig::default(), store).await
    }

    /// Start a server with explicit engine settings over `store`.
    pub async fn start_with(config: RandomFsConfig, store: Arc<dyn ContentStore>) -> Self {
        let engine = Arc::new(RandomFs::new(config, store).expect("valid engine config"));
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind loopback listener");
        let addr = listener.local_addr().expect("listener address");

        let (tx, rx) = oneshot::channel::<()>();
        let server = HttpServer::new(HttpServerConfig::new(engine.clone()));
        let handle = tokio::spawn(server.serve_listener(listener, async move {
            let _ = rx.await;
        }));

        Self {
            engine,
            base_url: format!("http://{addr}"),
            client: reqwest::Client::new(),
            shutdown: Some(tx),
            handle: Some(handle),
        }
    }

    /// Absolute URL for `path` on this server.
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Upload `data` as the multipart field `file`.
    pub async fn store(&self, filename: &str, content_type: &str, data: &[u8]) -> reqwest::Response {
        let part = Part::bytes(data.to_vec())
            .file_name(filename.to_string())
            .mime_str(content_type)
            .expect("valid content type");
        let form = Form::new().part("file", part);
        self.client
            .post(self.url("/api/v1/store"))
            .multipart(form)
            .send()
            .await
            .expect("store request sent")
    }

    /// Upload and assert success, returning the reply fields.
    pub async fn store_ok(&self, filename: &str, content_type: &str, data: &[u8]) -> StoredFile {
        let response = self.store(filename, content_type, data).await;
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        let json: Value = response.json().await.expect("JSON store reply");
        assert_eq!(json["success"], true);
        StoredFile {
            url: json["url"].as_str().expect("url").to_string(),
            hash: json["hash"].as_str().expect("hash").to_string(),
            size: json["size"].as_u64().expect("size"),
            filename: json["filename"].as_str().expect("filename").to_string(),
        }
    }

    /// `GET /api/v1/retrieve/{hash}`.
    pub async fn retrieve(&self, hash: &str) -> reqwest::Response {
        self.get(&format!("/api/v1/retrieve/{hash}")).await
    }

    /// `GET /rd/{base64(locator)}`.
    pub async fn open(&self, locator: &str) -> reqwest::Response {
        self.get(&format!("/rd/{}", URL_SAFE.encode(locator))).await
    }

    /// The `stats` object of `GET /api/v1/stats`.
    pub async fn stats(&self) -> Value {
        let json: Value = self
            .get("/api/v1/stats")
            .await
            .json()
            .await
            .expect("JSON stats reply");
        json["stats"].clone()
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("request sent")
    }

    /// Stop accepting connections and wait for the server task.
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            handle
                .await
                .expect("server task panicked")
                .expect("server exited with error");
        }
    }
}

// =========================================================================
// Failure injection
// =========================================================================

/// Store wrapper that can be switched off, as if the node went away.
pub struct OutageStore {
    inner: Arc<dyn ContentStore>,
    down: AtomicBool,
}

impl OutageStore {
    pub fn new(inner: Arc<dyn ContentStore>) -> Self {
        Self {
            inner,
            down: AtomicBool::new(false),
        }
    }

    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.down.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ContentStore for OutageStore {
    async fn put(&self, data: Bytes) -> Result<ContentId, StoreError> {
        self.check()?;
        self.inner.put(data).await
    }

    async fn get(&self, id: &ContentId) -> Result<Bytes, StoreError> {
        self.check()?;
        self.inner.get(id).await
    }
}
