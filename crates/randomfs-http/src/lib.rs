//! HTTP API for RandomFS.
//!
//! Provides an [`HttpServer`] exposing an axum router over any
//! [`RandomFsEngine`]:
//!
//! - `POST /api/v1/store`: multipart upload (field `file`), replies with the locator
//! - `GET /api/v1/retrieve/{hash}`: download by representation id
//! - `GET /api/v1/stats`: instance counters
//! - `GET /api/v1/health`: liveness probe
//! - `GET /rd/{*encoded}`: open a file by its URL-safe base64 encoded `rd://` locator
//!
//! Any other path falls through to a static directory when one is
//! configured. Every response carries permissive CORS headers.

mod error;
mod handlers;


use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::{Method, header};
use axum::routing::{get, post};
use randomfs_engine::RandomFsEngine;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

pub use error::ApiError;

/// Default request body limit: 1 GiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 1024 * 1024 * 1024;

/// Name reported by the health endpoint.
pub const SERVICE_NAME: &str = "randomfs-server";

/// Endpoint summary, logged at startup.
pub const ENDPOINTS: &[(&str, &str)] = &[
    ("POST /api/v1/store", "Store a file"),
    ("GET  /api/v1/retrieve/{hash}", "Retrieve a file"),
    ("GET  /api/v1/stats", "Get system stats"),
    ("GET  /api/v1/health", "Health check"),
    ("GET  /rd/{encoded-url}", "Access via rd:// URL"),
];

/// Shared application state for all handlers.
#[derive(Clone)]
pub(crate) struct AppState {
    pub engine: Arc<dyn RandomFsEngine>,
}

/// Configuration for creating an [`HttpServer`].
pub struct HttpServerConfig {
    /// The engine to serve.
    pub engine: Arc<dyn RandomFsEngine>,
    /// Directory served for paths outside the API, if any.
    pub web_dir: Option<PathBuf>,
    /// Largest accepted request body.
    pub max_upload_bytes: usize,
}

impl HttpServerConfig {
    /// API only, no static directory, default upload limit.
    pub fn new(engine: Arc<dyn RandomFsEngine>) -> Self {
        Self {
            engine,
            web_dir: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

/// HTTP server backed by a [`RandomFsEngine`].
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(config: HttpServerConfig) -> Self {
        let state = AppState {
            engine: config.engine,
        };
        Self {
            router: Self::build_router(state, config.web_dir, config.max_upload_bytes),
        }
    }

    fn build_router(state: AppState, web_dir: Option<PathBuf>, max_upload_bytes: usize) -> Router {
        let api = Router::new()
            .route("/store", post(handlers::store))
            .route("/retrieve/{hash}", get(handlers::retrieve))
            .route("/stats", get(handlers::stats))
            .route("/health", get(handlers::health));

        let mut router = Router::new()
            .nest("/api/v1", api)
            .route("/rd/{*encoded}", get(handlers::open_locator))
            .layer(DefaultBodyLimit::max(max_upload_bytes))
            .with_state(state);

        if let Some(dir) = web_dir {
            router = router.fallback_service(ServeDir::new(dir));
        }

        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE]);

        router.layer(cors).layer(TraceLayer::new_for_http())
    }

    /// Return the inner [`Router`] (useful for testing with `tower::ServiceExt`).
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Serve on the given TCP address.
    pub async fn serve(self, addr: &str) -> Result<(), std::io::Error> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!(addr, "http server listening");
        axum::serve(listener, self.router).await
    }

    /// Serve with graceful shutdown triggered by the given future.
    ///
    /// When `shutdown` completes, the server stops accepting new connections
    /// and waits for in-flight requests to finish.
    pub async fn serve_with_shutdown(
        self,
        addr: &str,
        shutdown: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> Result<(), std::io::Error> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        self.serve_listener(listener, shutdown).await
    }

    /// Serve on an already bound listener until `shutdown` completes.
    pub async fn serve_listener(
        self,
        listener: tokio::net::TcpListener,
        shutdown: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        info!(%addr, "http server listening");
        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await
    }
}
