//! In-memory version store using a Tokio mutex for single-node deployments.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, info};
use validator::Validate;

use quotever_core::error::AppError;
use quotever_core::result::AppResult;
use quotever_core::types::id::{DocumentId, VersionId};
use quotever_entity::version::{NewVersion, Version, VersionSummary};

use super::VersionStore;

/// Internal state for the memory-based version store.
#[derive(Debug, Default)]
struct InnerState {
    /// All live version rows.
    versions: HashMap<VersionId, Version>,
    /// Last allocated version number per document. Never decremented, so
    /// numbers freed by deletion are not handed out again.
    counters: HashMap<DocumentId, i32>,
}

impl InnerState {
    fn next_number(&mut self, document_id: DocumentId) -> i32 {
        let counter = self.counters.entry(document_id).or_insert(0);
        *counter += 1;
        *counter
    }

    fn active_id(&self, document_id: DocumentId) -> Option<VersionId> {
        self.versions
            .values()
            .find(|v| v.document_id == document_id && v.is_active)
            .map(|v| v.id)
    }

    fn insert(&mut self, new: NewVersion, activate: bool) -> Version {
        let now = Utc::now();
        let version_number = self.next_number(new.document_id);

        if activate {
            if let Some(previous) = self.active_id(new.document_id) {
                if let Some(row) = self.versions.get_mut(&previous) {
                    row.is_active = false;
                }
            }
        }

        let version = Version {
            id: VersionId::new(),
            document_id: new.document_id,
            version_number,
            version_name: new.version_name,
            change_reason: new.change_reason,
            is_active: activate,
            snapshot_data: new.snapshot_data,
            content_hash: new.content_hash,
            created_by: new.created_by,
            created_at: now,
            activated_at: activate.then_some(now),
        };
        self.versions.insert(version.id, version.clone());
        version
    }
}

/// In-memory version store guarded by a single Tokio mutex.
///
/// Every operation holds the lock for its whole duration, which makes
/// each one trivially atomic. Suitable for single-node deployments only;
/// contents are lost on restart.
#[derive(Debug, Clone, Default)]
pub struct MemoryVersionStore {
    /// Protected inner state.
    state: Arc<Mutex<InnerState>>,
}

impl MemoryVersionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of version rows across all documents.
    pub async fn len(&self) -> usize {
        self.state.lock().await.versions.len()
    }

    /// Whether the store holds no versions.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl VersionStore for MemoryVersionStore {
    async fn create(&self, new: NewVersion) -> AppResult<Version> {
        new.validate()?;
        let mut state = self.state.lock().await;
        let version = state.insert(new, false);

        info!(
            document_id = %version.document_id,
            version_id = %version.id,
            version_number = version.version_number,
            "Version created"
        );
        Ok(version)
    }

    async fn create_active(&self, new: NewVersion) -> AppResult<Version> {
        new.validate()?;
        let mut state = self.state.lock().await;
        let version = state.insert(new, true);

        info!(
            document_id = %version.document_id,
            version_id = %version.id,
            version_number = version.version_number,
            "Version created and activated"
        );
        Ok(version)
    }

    async fn get(&self, id: VersionId) -> AppResult<Version> {
        let state = self.state.lock().await;
        state
            .versions
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Version {id} not found")))
    }

    async fn list_by_document(&self, document_id: DocumentId) -> AppResult<Vec<VersionSummary>> {
        let state = self.state.lock().await;
        let mut versions: Vec<VersionSummary> = state
            .versions
            .values()
            .filter(|v| v.document_id == document_id)
            .map(Version::summary)
            .collect();
        versions.sort_by_key(|v| v.version_number);

        debug!(document_id = %document_id, count = versions.len(), "Listed versions");
        Ok(versions)
    }

    async fn active_version(&self, document_id: DocumentId) -> AppResult<Option<Version>> {
        let state = self.state.lock().await;
        Ok(state
            .active_id(document_id)
            .and_then(|id| state.versions.get(&id))
            .cloned())
    }

    async fn set_active(
        &self,
        document_id: DocumentId,
        version_number: i32,
    ) -> AppResult<Version> {
        let mut state = self.state.lock().await;

        let target_id = state
            .versions
            .values()
            .find(|v| v.document_id == document_id && v.version_number == version_number)
            .map(|v| v.id)
            .ok_or_else(|| {
                AppError::not_found(format!(
                    "Version {version_number} of document {document_id} not found"
                ))
            })?;

        let previous = state.active_id(document_id);
        if previous == Some(target_id) {
            return state
                .versions
                .get(&target_id)
                .cloned()
                .ok_or_else(|| AppError::internal("Active version vanished under lock"));
        }

        if let Some(row) = previous.and_then(|id| state.versions.get_mut(&id)) {
            row.is_active = false;
        }

        let row = state
            .versions
            .get_mut(&target_id)
            .ok_or_else(|| AppError::internal("Target version vanished under lock"))?;
        row.is_active = true;
        row.activated_at = Some(Utc::now());
        let activated = row.clone();

        info!(
            document_id = %document_id,
            version_id = %activated.id,
            version_number,
            "Version activated"
        );
        Ok(activated)
    }

    async fn delete(&self, id: VersionId) -> AppResult<()> {
        let mut state = self.state.lock().await;

        let version = state
            .versions
            .get(&id)
            .ok_or_else(|| AppError::not_found(format!("Version {id} not found")))?;

        if version.is_active {
            return Err(AppError::conflict(format!(
                "Version {} of document {} is active and cannot be deleted",
                version.version_number, version.document_id
            )));
        }

        let document_id = version.document_id;
        let version_number = version.version_number;
        state.versions.remove(&id);

        info!(
            document_id = %document_id,
            version_id = %id,
            version_number,
            "Version deleted"
        );
        Ok(())
    }
}
