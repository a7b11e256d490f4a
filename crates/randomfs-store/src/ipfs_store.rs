//! IPFS HTTP API backend.
//!
//! Talks to a Kubo-compatible RPC endpoint:
//!
//! - `POST /api/v0/add`: multipart upload, replies `{"Hash": "<cid>", ...}`
//! - `POST /api/v0/cat?arg=<cid>`: replies with the raw bytes
//! - `POST /api/v0/version`: liveness check, replies `{"Version": ...}`
//!
//! Missing objects come back either as a 404 or as a 500 whose JSON body
//! `{"Message": ...}` says the block could not be found; both map to
//! [`StoreError::NotFound`].

use std::time::Duration;

use bytes::Bytes;
use randomfs_types::ContentId;
use reqwest::multipart::{Form, Part};
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::traits::ContentStore;

/// Error-message fragments IPFS uses for absent or unresolvable content.
const NOT_FOUND_MARKERS: &[&str] = &["not found", "could not find", "invalid path", "invalid cid"];

/// Reply body of `/api/v0/add`.
#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AddResponse {
    hash: String,
}

/// Reply body of `/api/v0/version`.
#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct VersionResponse {
    version: String,
}

/// Error body returned by the IPFS RPC API.
#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ApiErrorBody {
    message: String,
}

/// Content store backed by an IPFS node's HTTP API.
pub struct IpfsStore {
    api_url: Url,
    client: reqwest::Client,
}

impl IpfsStore {
    /// Create a client for the API at `api_url` (e.g. `http://localhost:5001`).
    pub fn new(api_url: &str) -> Result<Self, StoreError> {
        Self::with_timeout(api_url, None)
    }

    /// Create a client whose requests give up after `timeout`.
    ///
    /// `None` leaves requests unbounded; callers needing cancellation can
    /// also wrap individual operations in their own deadline.
    pub fn with_timeout(api_url: &str, timeout: Option<Duration>) -> Result<Self, StoreError> {
        let api_url = Url::parse(api_url.trim_end_matches('/'))
            .map_err(|e| StoreError::InvalidEndpoint(format!("{api_url}: {e}")))?;
        if !matches!(api_url.scheme(), "http" | "https") {
            return Err(StoreError::InvalidEndpoint(format!(
                "{api_url}: scheme must be http or https"
            )));
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| StoreError::InvalidEndpoint(e.to_string()))?;

        Ok(Self { api_url, client })
    }

    /// Create a client and make sure the node answers before returning it.
    pub async fn connect(api_url: &str, timeout: Option<Duration>) -> Result<Self, StoreError> {
        let store = Self::with_timeout(api_url, timeout)?;
        store.check_connection().await?;
        Ok(store)
    }

    /// Ask the node for its version.
    ///
    /// Fails with [`StoreError::Unavailable`] when the node cannot be
    /// reached and [`StoreError::Rejected`] when it answers with an error.
    pub async fn check_connection(&self) -> Result<String, StoreError> {
        let response = self
            .client
            .post(self.endpoint("version"))
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = error_message(response).await;
            return Err(StoreError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let body: VersionResponse = response
            .json()
            .await
            .map_err(|e| StoreError::InvalidResponse(e.to_string()))?;
        info!(api = %self.api_url, version = %body.version, "connected to ipfs node");
        Ok(body.version)
    }

    /// The API base URL this client talks to.
    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/v0/{path}", self.api_url.as_str().trim_end_matches('/'))
    }
}

/// Pull the `Message` out of an IPFS error body, falling back to the raw text.
async fn error_message(response: reqwest::Response) -> String {
    let text = response.text().await.unwrap_or_default();
    serde_json::from_str::<ApiErrorBody>(&text)
        .map(|body| body.message)
        .unwrap_or(text)
}

fn looks_not_found(message: &str) -> bool {
    let message = message.to_ascii_lowercase();
    NOT_FOUND_MARKERS.iter().any(|m| message.contains(m))
}

#[async_trait::async_trait]
impl ContentStore for IpfsStore {
    async fn put(&self, data: Bytes) -> Result<ContentId, StoreError> {
        let size = data.len();
        let form = Form::new().part("file", Part::stream(data).file_name("block"));

        let response = self
            .client
            .post(self.endpoint("add"))
            .query(&[("pin", "true")])
            .multipart(form)
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = error_message(response).await;
            warn!(status = status.as_u16(), %message, "ipfs add rejected");
            return Err(StoreError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let body: AddResponse = response
            .json()
            .await
            .map_err(|e| StoreError::InvalidResponse(e.to_string()))?;
        if body.hash.is_empty() {
            return Err(StoreError::InvalidResponse(
                "add reply carries an empty hash".to_string(),
            ));
        }

        let id = ContentId::new(body.hash);
        debug!(%id, size, "stored object in ipfs");
        Ok(id)
    }

    async fn get(&self, id: &ContentId) -> Result<Bytes, StoreError> {
        let response = self
            .client
            .post(self.endpoint("cat"))
            .query(&[("arg", id.as_str())])
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound(id.clone()));
        }
        if !status.is_success() {
            let message = error_message(response).await;
            if looks_not_found(&message) {
                return Err(StoreError::NotFound(id.clone()));
            }
            warn!(%id, status = status.as_u16(), %message, "ipfs cat rejected");
            return Err(StoreError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let data = response
            .bytes()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        debug!(%id, size = data.len(), "fetched object from ipfs");
        Ok(data)
    }
}
