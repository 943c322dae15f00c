//! Version entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use quotever_core::config::versioning::{MAX_CHANGE_REASON_LENGTH, MAX_VERSION_NAME_LENGTH};
use quotever_core::types::id::{DocumentId, UserId, VersionId};

use super::snapshot::SnapshotData;
use super::state::VersionState;

/// An immutable snapshot of a quotation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Version {
    /// Unique version identifier.
    pub id: VersionId,
    /// The document this version belongs to.
    pub document_id: DocumentId,
    /// Per-document sequential number, starting at 1.
    pub version_number: i32,
    /// Optional human label.
    pub version_name: Option<String>,
    /// Optional description of why the version was taken.
    pub change_reason: Option<String>,
    /// Whether this is the document's canonical version.
    pub is_active: bool,
    /// Encoded document state.
    #[sqlx(json)]
    pub snapshot_data: SnapshotData,
    /// SHA-256 of the canonical snapshot bytes (hex).
    pub content_hash: String,
    /// User who created this version.
    pub created_by: UserId,
    /// When this version was created.
    pub created_at: DateTime<Utc>,
    /// When this version last became active, if ever.
    pub activated_at: Option<DateTime<Utc>>,
}

impl Version {
    /// Lifecycle state of this version.
    pub fn state(&self) -> VersionState {
        VersionState::derive(self.is_active, self.activated_at.is_some())
    }

    /// Metadata view without the snapshot payload.
    pub fn summary(&self) -> VersionSummary {
        VersionSummary {
            id: self.id,
            document_id: self.document_id,
            version_number: self.version_number,
            version_name: self.version_name.clone(),
            change_reason: self.change_reason.clone(),
            is_active: self.is_active,
            content_hash: self.content_hash.clone(),
            created_by: self.created_by,
            created_at: self.created_at,
            activated_at: self.activated_at,
        }
    }
}

/// Version metadata as returned by listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct VersionSummary {
    /// Unique version identifier.
    pub id: VersionId,
    /// The document this version belongs to.
    pub document_id: DocumentId,
    /// Per-document sequential number.
    pub version_number: i32,
    /// Optional human label.
    pub version_name: Option<String>,
    /// Optional change reason.
    pub change_reason: Option<String>,
    /// Whether this is the document's canonical version.
    pub is_active: bool,
    /// SHA-256 of the canonical snapshot bytes (hex).
    pub content_hash: String,
    /// User who created this version.
    pub created_by: UserId,
    /// When this version was created.
    pub created_at: DateTime<Utc>,
    /// When this version last became active, if ever.
    pub activated_at: Option<DateTime<Utc>>,
}

impl VersionSummary {
    /// Lifecycle state of this version.
    pub fn state(&self) -> VersionState {
        VersionState::derive(self.is_active, self.activated_at.is_some())
    }
}

/// Caller input for taking a new snapshot of a document.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateVersionRequest {
    /// Document to snapshot.
    pub document_id: DocumentId,
    /// Optional label.
    #[validate(length(max = MAX_VERSION_NAME_LENGTH, message = "Version name must be at most 100 characters"))]
    pub version_name: Option<String>,
    /// Optional reason.
    #[validate(length(max = MAX_CHANGE_REASON_LENGTH, message = "Change reason must be at most 500 characters"))]
    pub change_reason: Option<String>,
    /// Author.
    pub created_by: UserId,
}

impl CreateVersionRequest {
    /// Create a request with no label or reason.
    pub fn new(document_id: DocumentId, created_by: UserId) -> Self {
        Self {
            document_id,
            version_name: None,
            change_reason: None,
            created_by,
        }
    }

    /// Set the version label.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.version_name = Some(name.into());
        self
    }

    /// Set the change reason.
    pub fn because(mut self, reason: impl Into<String>) -> Self {
        self.change_reason = Some(reason.into());
        self
    }
}

/// Data required to insert a new version row.
///
/// The version number, id, and timestamps are assigned by the store.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewVersion {
    /// Owning document.
    pub document_id: DocumentId,
    /// Encoded document state.
    pub snapshot_data: SnapshotData,
    /// Hash of `snapshot_data`.
    pub content_hash: String,
    /// Optional label.
    #[validate(length(max = MAX_VERSION_NAME_LENGTH, message = "Version name must be at most 100 characters"))]
    pub version_name: Option<String>,
    /// Optional reason.
    #[validate(length(max = MAX_CHANGE_REASON_LENGTH, message = "Change reason must be at most 500 characters"))]
    pub change_reason: Option<String>,
    /// Author.
    pub created_by: UserId,
}
