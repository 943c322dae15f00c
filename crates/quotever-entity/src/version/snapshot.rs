//! Stored snapshot payload.

use serde::{Deserialize, Serialize};

/// Encoded document state as persisted on a version row.
///
/// Produced by the snapshot codec and never modified after insert. Stored
/// as verbatim `JSON` text so the content hash survives the round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SnapshotData(serde_json::Value);

impl SnapshotData {
    /// Wrap an already-encoded payload.
    pub fn from_json(value: serde_json::Value) -> Self {
        Self(value)
    }

    /// Borrow the raw payload.
    pub fn as_json(&self) -> &serde_json::Value {
        &self.0
    }
}
