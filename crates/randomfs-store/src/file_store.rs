//! File-based content store backend.
//!
//! Stores one file per object with a 2-level fan-out directory structure:
//! `{base_dir}/{hex[0..2]}/{hex[2..4]}/{hex}`.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use randomfs_types::ContentId;
use tracing::{debug, error};

use crate::error::StoreError;
use crate::traits::ContentStore;

/// Length of a BLAKE3 hex digest, the only id shape this backend issues.
const ID_LEN: usize = 64;

/// File-based content store with 2-level fan-out directory layout.
///
/// Lets the daemon run offline: blocks and representation records live
/// under the data directory instead of an IPFS node.
///
/// Writes are atomic: data is written to a temporary file first, then
/// renamed into place.
pub struct FileStore {
    base_dir: PathBuf,
}

impl FileStore {
    /// Create a new file store rooted at the given directory.
    ///
    /// The directory is created if it does not exist.
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let base_dir = base_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    /// Root directory of the store.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Compute the full file path for an object id.
    ///
    /// Returns `None` for ids this backend could never have issued, so a
    /// foreign id cannot escape the base directory.
    fn object_path(&self, id: &ContentId) -> Option<PathBuf> {
        let hex = id.as_str();
        if hex.len() != ID_LEN || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        Some(self.base_dir.join(&hex[0..2]).join(&hex[2..4]).join(hex))
    }
}

#[async_trait::async_trait]
impl ContentStore for FileStore {
    async fn put(&self, data: Bytes) -> Result<ContentId, StoreError> {
        let id = ContentId::from_data(&data);
        let path = self
            .object_path(&id)
            .ok_or_else(|| StoreError::InvalidResponse(format!("unusable object id {id}")))?;

        if tokio::fs::try_exists(&path).await? {
            debug!(%id, "object already on disk");
            return Ok(id);
        }

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        // Write to a temp file in the same directory, then rename. Each
        // writer gets its own temp name so concurrent puts of the same
        // bytes never share one.
        let tmp_path = path.with_extension(format!("{:016x}.tmp", rand::random::<u64>()));
        let written = match tokio::fs::write(&tmp_path, &data).await {
            Ok(()) => tokio::fs::rename(&tmp_path, &path).await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(e.into());
        }

        debug!(%id, path = %path.display(), size = data.len(), "stored object to file");
        Ok(id)
    }

    async fn get(&self, id: &ContentId) -> Result<Bytes, StoreError> {
        let path = self
            .object_path(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;

        match tokio::fs::read(&path).await {
            Ok(data) => {
                // Verify-on-read: a corrupt object is an error, never returned.
                let actual = ContentId::from_data(&data);
                if actual != *id {
                    error!(expected = %id, %actual, "object corruption detected on read");
                    return Err(StoreError::CorruptObject {
                        expected: id.clone(),
                        actual,
                    });
                }
                Ok(Bytes::from(data))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(id.clone()))
            }
            Err(e) => Err(StoreError::Io(e)),
        }
    }
}
