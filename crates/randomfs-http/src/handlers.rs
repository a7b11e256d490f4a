//! API request handlers.

use axum::Json;
use axum::body::Body;
use axum::extract::{Multipart, Path, State};
use axum::http::{Response, header};
use base64::Engine;
use base64::engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD};
use randomfs_types::{ContentId, PROTOCOL_VERSION, Representation, Stats};
use serde::Serialize;
use tracing::info;

use crate::error::ApiError;
use crate::{AppState, SERVICE_NAME};

/// Multipart field carrying the upload.
const FILE_FIELD: &str = "file";

/// Content type recorded when the upload does not name one.
const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

// -----------------------------------------------------------------------
// POST /api/v1/store
// -----------------------------------------------------------------------

#[derive(Serialize)]
pub(crate) struct StoreResponse {
    pub success: bool,
    pub url: String,
    pub hash: String,
    pub size: u64,
    pub filename: String,
}

/// Store the multipart field `file` and reply with its locator.
pub(crate) async fn store(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<StoreResponse>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("failed to read file: {e}")))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let content_type = field
            .content_type()
            .filter(|ct| !ct.is_empty())
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("failed to read file data: {e}")))?;

        let locator = state
            .engine
            .store_file(&filename, &data, &content_type)
            .await?;

        info!(%locator, size = data.len(), %content_type, "file stored via api");
        return Ok(Json(StoreResponse {
            success: true,
            url: locator.to_string(),
            hash: locator.representation_id.to_string(),
            size: locator.file_size,
            filename: locator.file_name,
        }));
    }

    Err(ApiError::BadRequest(format!(
        "failed to read file: multipart field {FILE_FIELD:?} missing"
    )))
}

// -----------------------------------------------------------------------
// GET /api/v1/retrieve/{hash}
// -----------------------------------------------------------------------

/// Download a file by representation id.
pub(crate) async fn retrieve(
    State(state): State<AppState>,
    Path(hash): Path<String>,
) -> Result<Response<Body>, ApiError> {
    let id = ContentId::new(hash);
    let (data, rep) = state.engine.retrieve_file(&id).await?;
    file_response(data, &rep, "attachment")
}

// -----------------------------------------------------------------------
// GET /rd/{*encoded}
// -----------------------------------------------------------------------

/// Open a file by its base64-encoded `rd://` locator, for display in place.
pub(crate) async fn open_locator(
    State(state): State<AppState>,
    Path(encoded): Path<String>,
) -> Result<Response<Body>, ApiError> {
    let raw = decode_locator(&encoded)?;
    let locator = state.engine.parse_locator(&raw)?;
    let (data, rep) = state
        .engine
        .retrieve_file(&locator.representation_id)
        .await?;
    file_response(data, &rep, "inline")
}

/// Accepts URL-safe base64 with or without padding.
fn decode_locator(encoded: &str) -> Result<String, ApiError> {
    let bytes = URL_SAFE
        .decode(encoded)
        .or_else(|_| URL_SAFE_NO_PAD.decode(encoded))
        .map_err(|e| ApiError::BadRequest(format!("invalid encoded URL: {e}")))?;
    String::from_utf8(bytes)
        .map_err(|_| ApiError::BadRequest("invalid encoded URL: not UTF-8".to_string()))
}

// -----------------------------------------------------------------------
// GET /api/v1/stats, GET /api/v1/health
// -----------------------------------------------------------------------

#[derive(Serialize)]
pub(crate) struct StatsResponse {
    pub success: bool,
    pub stats: Stats,
}

pub(crate) async fn stats(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse {
        success: true,
        stats: state.engine.stats(),
    })
}

#[derive(Serialize)]
pub(crate) struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

pub(crate) async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: SERVICE_NAME,
        version: PROTOCOL_VERSION,
    })
}

// -----------------------------------------------------------------------
// Helpers
// -----------------------------------------------------------------------

fn file_response(
    data: Vec<u8>,
    rep: &Representation,
    disposition: &str,
) -> Result<Response<Body>, ApiError> {
    Response::builder()
        .header(header::CONTENT_TYPE, rep.content_type.as_str())
        .header(
            header::CONTENT_DISPOSITION,
            format!("{disposition}; filename=\"{}\"", quoted_filename(&rep.filename)),
        )
        .header(header::CONTENT_LENGTH, data.len())
        .body(Body::from(data))
        .map_err(|e| ApiError::Internal(format!("failed to build response: {e}")))
}

/// Replace characters that cannot appear inside a quoted header parameter.
fn quoted_filename(name: &str) -> String {
    name.chars()
        .map(|c| if c == '"' || c == '\\' || c.is_control() { '_' } else { c })
        .collect()
}
