//! Snapshot codec: live document state to stored snapshot and back.
//!
//! A snapshot is a JSON envelope `{ "format": 1, "fields": { ... } }`.
//! Map keys are kept in sorted order, so equal states always produce the
//! same canonical bytes and therefore the same content hash, regardless of
//! how the storage layer orders object keys.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use quotever_core::error::{AppError, ErrorKind};
use quotever_entity::document::DocumentState;
use quotever_entity::value::Value;
use quotever_entity::version::SnapshotData;

/// Envelope format written by [`encode`].
pub const SNAPSHOT_FORMAT: u32 = 1;

/// Reasons a stored snapshot cannot be decoded.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The envelope is missing fields, has extra fields, or has the wrong
    /// types.
    #[error("malformed snapshot envelope: {0}")]
    Malformed(#[source] serde_json::Error),
    /// The envelope was written by an unknown codec version.
    #[error("unsupported snapshot format {0}")]
    UnsupportedFormat(u32),
    /// The stored hash does not match the stored payload.
    #[error("content hash mismatch: expected {expected}, computed {actual}")]
    HashMismatch {
        /// Hash recorded alongside the snapshot.
        expected: String,
        /// Hash of the payload as read back.
        actual: String,
    },
}

impl From<SnapshotError> for AppError {
    fn from(err: SnapshotError) -> Self {
        AppError::with_source(
            ErrorKind::CorruptSnapshot,
            format!("Corrupt snapshot: {err}"),
            err,
        )
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct Envelope {
    format: u32,
    fields: BTreeMap<String, Value>,
}

/// Encode a document state into its storable form.
pub fn encode(state: &DocumentState) -> SnapshotData {
    let envelope = Value::Map(BTreeMap::from([
        ("fields".to_string(), state.to_value()),
        ("format".to_string(), Value::from(i64::from(SNAPSHOT_FORMAT))),
    ]));
    SnapshotData::from_json(envelope.into())
}

/// Decode a stored snapshot back into document state.
pub fn decode(data: &SnapshotData) -> Result<DocumentState, SnapshotError> {
    let envelope: Envelope =
        serde_json::from_value(data.as_json().clone()).map_err(SnapshotError::Malformed)?;

    if envelope.format != SNAPSHOT_FORMAT {
        return Err(SnapshotError::UnsupportedFormat(envelope.format));
    }

    Ok(DocumentState::from_fields(envelope.fields))
}

/// Decode a stored snapshot after checking it against its recorded hash.
pub fn decode_verified(
    data: &SnapshotData,
    expected_hash: &str,
) -> Result<DocumentState, SnapshotError> {
    let actual = content_hash(data);
    if actual != expected_hash {
        return Err(SnapshotError::HashMismatch {
            expected: expected_hash.to_string(),
            actual,
        });
    }
    decode(data)
}

/// SHA-256 of the snapshot's canonical JSON bytes, hex encoded.
pub fn content_hash(data: &SnapshotData) -> String {
    let canonical = canonical_bytes(data);
    format!("{:x}", Sha256::digest(&canonical))
}

fn canonical_bytes(data: &SnapshotData) -> Vec<u8> {
    // Re-keying through `Value` sorts every object, whatever order the
    // JSON arrived in.
    let canonical = Value::from(data.as_json().clone());
    serde_json::to_vec(&canonical).unwrap_or_default()
}
