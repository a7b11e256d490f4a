//! Error types for the engine.

use randomfs_cas::CasError;
use randomfs_store::StoreError;
use randomfs_types::{ContentId, LocatorError};

/// Errors that can occur during engine operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The engine was constructed with unusable settings.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The content store failed or refused a request.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Masking or record encoding failed on the store path.
    #[error("cas error: {0}")]
    Cas(#[from] CasError),

    /// A locator string could not be parsed.
    #[error(transparent)]
    Locator(#[from] LocatorError),

    /// A file record was found but the file could not be rebuilt from it.
    #[error("reconstruction of {id} failed: {reason}")]
    ReconstructionFailed {
        /// Representation id being retrieved.
        id: ContentId,
        /// What went wrong.
        reason: String,
    },
}

/// Coarse classification of an [`EngineError`], for front ends that need
/// to map failures onto their own status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    StoreUnavailable,
    StoreRejected,
    NotFound,
    MalformedLocator,
    ReconstructionFailed,
    /// Random source or serialization failures.
    Internal,
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::Store(e) => match e {
                StoreError::NotFound(_) => ErrorKind::NotFound,
                StoreError::Unavailable(_) | StoreError::Io(_) => ErrorKind::StoreUnavailable,
                StoreError::Rejected { .. } | StoreError::InvalidResponse(_) => {
                    ErrorKind::StoreRejected
                }
                StoreError::InvalidEndpoint(_) => ErrorKind::Configuration,
                StoreError::CorruptObject { .. } => ErrorKind::Internal,
            },
            Self::Cas(_) => ErrorKind::Internal,
            Self::Locator(_) => ErrorKind::MalformedLocator,
            Self::ReconstructionFailed { .. } => ErrorKind::ReconstructionFailed,
        }
    }

    pub(crate) fn reconstruction(id: &ContentId, reason: impl ToString) -> Self {
        Self::ReconstructionFailed {
            id: id.clone(),
            reason: reason.to_string(),
        }
    }
}
