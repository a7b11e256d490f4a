//! The `rd://` locator: a self-contained reference to a stored file.
//!
//! Serialized form, six positional fields after the scheme:
//!
//! ```text
//! rd://<host>/<version>/<file_size>/<file_name>/<timestamp>/<representation_id>
//! ```
//!
//! The representation id is always the last segment and the file name the
//! fourth, so a file name can never be confused with the id.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{ContentId, LOCATOR_SCHEME};

/// Number of `/`-separated segments after `rd://`.
const SEGMENT_COUNT: usize = 6;

/// Errors produced when a locator string does not have the `rd://` shape.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocatorError {
    /// The string does not start with `rd://`.
    #[error("malformed locator: expected scheme {expected}://")]
    WrongScheme {
        /// Scheme this system accepts.
        expected: &'static str,
    },

    /// Wrong number of path segments.
    #[error("malformed locator: expected {expected} segments, found {found}")]
    SegmentCount {
        /// Required segment count.
        expected: usize,
        /// Segments present in the input.
        found: usize,
    },

    /// A required text field is empty.
    #[error("malformed locator: empty {field}")]
    EmptySegment {
        /// Name of the empty field.
        field: &'static str,
    },

    /// A numeric field does not parse as an unsigned integer.
    #[error("malformed locator: invalid {field} {value:?}")]
    InvalidNumber {
        /// Name of the numeric field.
        field: &'static str,
        /// The offending text.
        value: String,
    },
}

/// Parsed `rd://` locator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locator {
    /// Host/namespace field.
    pub host: String,
    /// Format version tag.
    pub version: String,
    /// Original file size in bytes.
    pub file_size: u64,
    /// Original file base name.
    pub file_name: String,
    /// Unix timestamp (seconds) of the store operation.
    pub timestamp: u64,
    /// Content-store id of the representation record.
    pub representation_id: ContentId,
}

impl Locator {
    /// Parse a locator string.
    pub fn parse(raw: &str) -> Result<Self, LocatorError> {
        let rest = raw
            .strip_prefix(LOCATOR_SCHEME)
            .and_then(|r| r.strip_prefix("://"))
            .ok_or(LocatorError::WrongScheme {
                expected: LOCATOR_SCHEME,
            })?;

        let segments: Vec<&str> = rest.split('/').collect();
        let &[host, version, file_size, file_name, timestamp, rep_id] = segments.as_slice() else {
            return Err(LocatorError::SegmentCount {
                expected: SEGMENT_COUNT,
                found: segments.len(),
            });
        };

        Ok(Self {
            host: non_empty("host", host)?.to_string(),
            version: non_empty("version", version)?.to_string(),
            file_size: parse_number("file size", file_size)?,
            file_name: non_empty("file name", file_name)?.to_string(),
            timestamp: parse_number("timestamp", timestamp)?,
            representation_id: ContentId::new(non_empty("representation id", rep_id)?),
        })
    }
}

fn non_empty<'a>(field: &'static str, value: &'a str) -> Result<&'a str, LocatorError> {
    if value.is_empty() {
        return Err(LocatorError::EmptySegment { field });
    }
    Ok(value)
}

fn parse_number(field: &'static str, value: &str) -> Result<u64, LocatorError> {
    // `u64::from_str` accepts a leading '+', which would break the round trip.
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(LocatorError::InvalidNumber {
            field,
            value: value.to_string(),
        });
    }
    value.parse().map_err(|_| LocatorError::InvalidNumber {
        field,
        value: value.to_string(),
    })
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{LOCATOR_SCHEME}://{}/{}/{}/{}/{}/{}",
            self.host,
            self.version,
            self.file_size,
            self.file_name,
            self.timestamp,
            self.representation_id
        )
    }
}

impl FromStr for Locator {
    type Err = LocatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
