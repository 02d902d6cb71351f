//! Binary encoding of store snapshots.
//!
//! Provides postcard encode/decode for [`StoreSnapshot`] so an in-process
//! store can be persisted between runs.

use crate::document::{SNAPSHOT_VERSION, StoreSnapshot};

/// Error type for codec encode/decode operations.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),
    /// The snapshot was written by an incompatible format version.
    #[error("unsupported snapshot version {found} (expected {expected})")]
    UnsupportedVersion {
        /// Version found in the data.
        found: u32,
        /// Version this build reads.
        expected: u32,
    },
}

/// Encodes a [`StoreSnapshot`] into a byte vector using postcard.
///
/// # Errors
///
/// Returns `CodecError::Serialization` if the snapshot cannot be serialized.
pub fn encode(snapshot: &StoreSnapshot) -> Result<Vec<u8>, CodecError> {
    postcard::to_allocvec(snapshot).map_err(|e| CodecError::Serialization(e.to_string()))
}

/// Decodes a [`StoreSnapshot`] from a byte slice using postcard.
///
/// # Errors
///
/// Returns `CodecError::Serialization` if the bytes cannot be deserialized,
/// or `CodecError::UnsupportedVersion` if the version does not match.
pub fn decode(bytes: &[u8]) -> Result<StoreSnapshot, CodecError> {
    let snapshot: StoreSnapshot =
        postcard::from_bytes(bytes).map_err(|e| CodecError::Serialization(e.to_string()))?;
    if snapshot.version != SNAPSHOT_VERSION {
        return Err(CodecError::UnsupportedVersion {
            found: snapshot.version,
            expected: SNAPSHOT_VERSION,
        });
    }
    Ok(snapshot)
}
