//! API error type and its JSON rendering.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use randomfs_engine::{EngineError, ErrorKind};
use serde::Serialize;
use tracing::{debug, warn};

/// Errors returned by API handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request itself is unusable.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// An error from the engine.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Building the response failed.
    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Engine(e) => match e.kind() {
                ErrorKind::MalformedLocator => StatusCode::BAD_REQUEST,
                ErrorKind::NotFound | ErrorKind::ReconstructionFailed => StatusCode::NOT_FOUND,
                ErrorKind::StoreUnavailable | ErrorKind::StoreRejected => StatusCode::BAD_GATEWAY,
                ErrorKind::Configuration | ErrorKind::Internal => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error = self.to_string();
        if status.is_server_error() {
            warn!(status = status.as_u16(), %error, "request failed");
        } else {
            debug!(status = status.as_u16(), %error, "request rejected");
        }

        (
            status,
            Json(ErrorBody {
                success: false,
                error,
            }),
        )
            .into_response()
    }
}
