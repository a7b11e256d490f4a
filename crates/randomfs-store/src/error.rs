//! Error types for content store operations.

use randomfs_types::ContentId;

/// Errors that can occur while talking to a content store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested object is not in the store.
    #[error("object not found: {0}")]
    NotFound(ContentId),

    /// The store could not be reached (connection refused, reset, timeout).
    #[error("content store unavailable: {0}")]
    Unavailable(String),

    /// The store answered with a non-success status.
    #[error("content store rejected request with status {status}: {message}")]
    Rejected {
        /// HTTP status code returned by the store.
        status: u16,
        /// Error message from the response body, if any.
        message: String,
    },

    /// The store answered successfully but the reply could not be understood.
    #[error("invalid content store response: {0}")]
    InvalidResponse(String),

    /// The store endpoint or client settings are unusable.
    #[error("invalid content store endpoint: {0}")]
    InvalidEndpoint(String),

    /// An I/O error occurred in a local backend.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Object data on disk does not match its content-addressed ID.
    #[error("object corruption detected: expected {expected}, actual hash {actual}")]
    CorruptObject {
        /// The ID that was requested.
        expected: ContentId,
        /// The ID computed from the data actually on disk.
        actual: ContentId,
    },
}
