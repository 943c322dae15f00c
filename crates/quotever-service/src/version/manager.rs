//! Version manager: create, activate, compare, roll back, and delete.

use std::sync::Arc;

use tracing::{debug, error, info, warn};
use validator::Validate;

use quotever_core::error::{AppError, ErrorKind};
use quotever_core::result::AppResult;
use quotever_core::types::id::{DocumentId, UserId, VersionId};
use quotever_database::document::DocumentOwner;
use quotever_database::store::VersionStore;
use quotever_entity::change::Change;
use quotever_entity::document::DocumentState;
use quotever_entity::version::{CreateVersionRequest, NewVersion, Version, VersionSummary};

use super::locks::DocumentLocks;
use crate::codec;
use crate::diff::DiffEngine;

/// Orchestrates the version lifecycle for quotations.
///
/// The store guarantees atomicity of each single call; the manager adds
/// the multi-step rollback with compensation on top.
#[derive(Debug, Clone)]
pub struct VersionManager {
    /// Version repository.
    store: Arc<dyn VersionStore>,
    /// Owner of live document state.
    owner: Arc<dyn DocumentOwner>,
    /// Snapshot comparison.
    diff: DiffEngine,
    /// Serializes rollbacks and snapshots per document.
    locks: DocumentLocks,
}

impl VersionManager {
    /// Creates a new version manager.
    pub fn new(
        store: Arc<dyn VersionStore>,
        owner: Arc<dyn DocumentOwner>,
        diff: DiffEngine,
    ) -> Self {
        Self {
            store,
            owner,
            diff,
            locks: DocumentLocks::default(),
        }
    }

    /// Snapshot the document's current live state as a new draft version.
    ///
    /// The active version is left untouched.
    pub async fn create_version(&self, request: CreateVersionRequest) -> AppResult<Version> {
        request.validate()?;
        let document_id = request.document_id;
        let _guard = self.locks.acquire(document_id).await;

        let state = self.owner.read_state(document_id).await?;
        let snapshot_data = codec::encode(&state);
        let content_hash = codec::content_hash(&snapshot_data);

        let version = self
            .store
            .create(NewVersion {
                document_id,
                snapshot_data,
                content_hash,
                version_name: request.version_name,
                change_reason: request.change_reason,
                created_by: request.created_by,
            })
            .await?;

        info!(
            document_id = %document_id,
            version_id = %version.id,
            version_number = version.version_number,
            user_id = %version.created_by,
            "Snapshot taken"
        );
        Ok(version)
    }

    /// Fetch one version, snapshot included.
    pub async fn get_version(&self, version_id: VersionId) -> AppResult<Version> {
        self.store.get(version_id).await
    }

    /// List a document's versions in ascending number order.
    pub async fn list_versions(&self, document_id: DocumentId) -> AppResult<Vec<VersionSummary>> {
        if !self.owner.exists(document_id).await? {
            return Err(AppError::not_found(format!(
                "Document {document_id} not found"
            )));
        }
        self.store.list_by_document(document_id).await
    }

    /// The document's active version, if one has been chosen.
    pub async fn get_active_version(&self, document_id: DocumentId) -> AppResult<Option<Version>> {
        self.store.active_version(document_id).await
    }

    /// Make the numbered version the document's active version.
    ///
    /// Only the active pointer moves; live document state is not touched.
    pub async fn activate_version(
        &self,
        document_id: DocumentId,
        version_number: i32,
    ) -> AppResult<Version> {
        self.store.set_active(document_id, version_number).await
    }

    /// Activate a version by id, checking that it belongs to the document.
    pub async fn activate_version_id(
        &self,
        document_id: DocumentId,
        version_id: VersionId,
    ) -> AppResult<Version> {
        let version = self.owned_version(document_id, version_id).await?;
        self.store
            .set_active(document_id, version.version_number)
            .await
    }

    /// Fetch a version and decode its snapshot.
    pub async fn decode_version(&self, version_id: VersionId) -> AppResult<DocumentState> {
        let version = self.store.get(version_id).await?;
        self.decode_snapshot(&version)
    }

    /// Decode the snapshot of an already fetched version, checking its hash.
    pub fn decode_snapshot(&self, version: &Version) -> AppResult<DocumentState> {
        codec::decode_verified(&version.snapshot_data, &version.content_hash).map_err(|e| {
            error!(
                document_id = %version.document_id,
                version_id = %version.id,
                version_number = version.version_number,
                error = %e,
                "Corrupt snapshot"
            );
            AppError::from(e)
        })
    }

    /// Field-level changes from one version to another of the same document.
    pub async fn compare_versions(
        &self,
        document_id: DocumentId,
        from_version_id: VersionId,
        to_version_id: VersionId,
    ) -> AppResult<Vec<Change>> {
        let from = self.owned_version(document_id, from_version_id).await?;
        let to = self.owned_version(document_id, to_version_id).await?;

        let changes = self
            .diff
            .compare(&self.decode_snapshot(&from)?, &self.decode_snapshot(&to)?);

        debug!(
            document_id = %document_id,
            from = from.version_number,
            to = to.version_number,
            changes = changes.len(),
            "Compared versions"
        );
        Ok(changes)
    }

    /// Field-level changes from a version to the document's live state.
    pub async fn diff_against_live(
        &self,
        document_id: DocumentId,
        version_id: VersionId,
    ) -> AppResult<Vec<Change>> {
        let version = self.owned_version(document_id, version_id).await?;
        let stored = self.decode_snapshot(&version)?;
        let live = self.owner.read_state(document_id).await?;
        Ok(self.diff.compare(&stored, &live))
    }

    /// Restore the document to a prior version.
    ///
    /// Writes the version's state back to the live document, records that
    /// state as a new version and activates it. If recording fails after the
    /// live write, the previous live state is written back and the original
    /// error is returned.
    ///
    /// Rolling back to the active version while the live document still
    /// matches it records nothing and returns that version.
    ///
    /// The sequence runs on its own task: dropping the returned future
    /// (a timeout, a disconnected caller) does not stop it between the live
    /// write and the version record.
    pub async fn rollback_to_version(
        &self,
        document_id: DocumentId,
        version_id: VersionId,
        reason: Option<String>,
        performed_by: UserId,
    ) -> AppResult<Version> {
        let manager = self.clone();
        let task = tokio::spawn(async move {
            manager
                .run_rollback(document_id, version_id, reason, performed_by)
                .await
        });

        task.await.map_err(|e| {
            error!(document_id = %document_id, error = %e, "Rollback task failed");
            AppError::with_source(ErrorKind::Internal, "Rollback task failed", e)
        })?
    }

    async fn run_rollback(
        &self,
        document_id: DocumentId,
        version_id: VersionId,
        reason: Option<String>,
        performed_by: UserId,
    ) -> AppResult<Version> {
        let _guard = self.locks.acquire(document_id).await;

        let target = self.owned_version(document_id, version_id).await?;
        let restored = self.decode_snapshot(&target)?;
        let previous = self.owner.read_state(document_id).await?;

        if target.is_active && previous == restored {
            info!(
                document_id = %document_id,
                version_id = %target.id,
                version_number = target.version_number,
                "Rollback target already active and current"
            );
            return Ok(target);
        }

        let snapshot_data = codec::encode(&restored);
        let new_version = NewVersion {
            document_id,
            content_hash: codec::content_hash(&snapshot_data),
            snapshot_data,
            version_name: None,
            change_reason: Some(
                reason.unwrap_or_else(|| format!("Rollback to version {}", target.version_number)),
            ),
            created_by: performed_by,
        };
        // Reject bad input before the live document is touched.
        new_version.validate()?;

        self.owner.write_state(document_id, &restored).await?;

        match self.store.create_active(new_version).await {
            Ok(version) => {
                info!(
                    document_id = %document_id,
                    version_id = %version.id,
                    version_number = version.version_number,
                    restored_from = target.version_number,
                    user_id = %performed_by,
                    "Rolled back"
                );
                Ok(version)
            }
            Err(err) => {
                warn!(
                    document_id = %document_id,
                    target_version = target.version_number,
                    error = %err,
                    "Recording rollback failed, restoring previous live state"
                );
                if let Err(restore_err) = self.owner.write_state(document_id, &previous).await {
                    error!(
                        document_id = %document_id,
                        error = %restore_err,
                        "Failed to restore live state after rollback failure"
                    );
                }
                Err(err)
            }
        }
    }

    /// Permanently delete a version. Active versions cannot be deleted.
    pub async fn delete_version(&self, version_id: VersionId) -> AppResult<()> {
        self.store.delete(version_id).await
    }

    async fn owned_version(
        &self,
        document_id: DocumentId,
        version_id: VersionId,
    ) -> AppResult<Version> {
        let version = self.store.get(version_id).await?;
        if version.document_id != document_id {
            return Err(AppError::conflict(format!(
                "Version {version_id} belongs to document {}, not {document_id}",
                version.document_id
            )));
        }
        Ok(version)
    }
}
