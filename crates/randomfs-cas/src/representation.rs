//! Representation record building and serialization.
//!
//! A [`Representation`] is stored in the content store like any block, as a
//! JSON object. JSON keeps the record self-describing: a reader checks
//! `format_version` first and only then decodes the rest.

use randomfs_types::{ContentId, PROTOCOL_VERSION, Representation};
use serde::Deserialize;

use crate::error::CasError;

/// Name used when a supplied filename has no usable base name.
const FALLBACK_NAME: &str = "unnamed";

/// Only the version field, decoded before anything else is trusted.
#[derive(Deserialize)]
struct VersionProbe {
    format_version: String,
}

/// Build a [`Representation`] stamped with the current time.
pub fn build_representation(
    filename: &str,
    file_size: u64,
    block_ids: Vec<ContentId>,
    block_size: u32,
    content_type: &str,
) -> Representation {
    build_representation_with_timestamp(
        filename,
        file_size,
        block_ids,
        block_size,
        content_type,
        now_secs(),
    )
}

/// Build a representation with an explicit timestamp (for deterministic testing).
pub fn build_representation_with_timestamp(
    filename: &str,
    file_size: u64,
    block_ids: Vec<ContentId>,
    block_size: u32,
    content_type: &str,
    created_at: u64,
) -> Representation {
    Representation {
        filename: base_name(filename).to_string(),
        file_size,
        block_ids,
        block_size,
        created_at,
        content_type: content_type.to_string(),
        format_version: PROTOCOL_VERSION.to_string(),
    }
}

/// Serialize a representation to JSON bytes.
pub fn serialize_representation(rep: &Representation) -> Result<Vec<u8>, CasError> {
    serde_json::to_vec(rep).map_err(|e| CasError::Serialization(e.to_string()))
}

/// Deserialize and validate a representation.
///
/// Rejects records with an unknown `format_version` before decoding the
/// remaining fields, and records whose block list does not match
/// `file_size` / `block_size`.
pub fn deserialize_representation(bytes: &[u8]) -> Result<Representation, CasError> {
    let probe: VersionProbe =
        serde_json::from_slice(bytes).map_err(|e| CasError::Serialization(e.to_string()))?;
    if probe.format_version != PROTOCOL_VERSION {
        return Err(CasError::UnsupportedVersion {
            found: probe.format_version,
            supported: PROTOCOL_VERSION,
        });
    }

    let rep: Representation =
        serde_json::from_slice(bytes).map_err(|e| CasError::Serialization(e.to_string()))?;

    if rep.block_size == 0 {
        return Err(CasError::InvalidRepresentation(
            "block size is zero".to_string(),
        ));
    }
    let expected = rep.expected_block_count();
    if rep.block_ids.len() != expected {
        return Err(CasError::InvalidRepresentation(format!(
            "{} bytes at block size {} needs {expected} blocks, record lists {}",
            rep.file_size,
            rep.block_size,
            rep.block_ids.len()
        )));
    }

    Ok(rep)
}

/// Strip any directory components from a filename.
///
/// Both `/` and `\` count as separators, so the result can never introduce
/// an extra segment into a locator.
pub fn base_name(filename: &str) -> &str {
    match filename.rsplit(['/', '\\']).next() {
        Some(name) if !name.is_empty() && name != "." && name != ".." => name,
        _ => FALLBACK_NAME,
    }
}

fn now_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
