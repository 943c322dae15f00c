//! PostgreSQL version store.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, info};
use validator::Validate;

use quotever_core::error::AppError;
use quotever_core::result::AppResult;
use quotever_core::types::id::{DocumentId, VersionId};
use quotever_entity::version::{NewVersion, Version, VersionSummary};

use super::VersionStore;
use crate::error::db_error;

const SUMMARY_COLUMNS: &str = "id, document_id, version_number, version_name, change_reason, \
     is_active, content_hash, created_by, created_at, activated_at";

/// Version store backed by the `quotation_versions` table.
///
/// Writers on the same document serialize on the document's row in
/// `quotation_version_counters`; the partial unique index on active rows
/// backs the single-active invariant at the storage level.
#[derive(Debug, Clone)]
pub struct PgVersionStore {
    pool: PgPool,
}

impl PgVersionStore {
    /// Create a new version store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Allocate the next number for a document, taking the counter row lock
    /// until the surrounding transaction ends.
    async fn allocate_number(
        tx: &mut Transaction<'_, Postgres>,
        document_id: DocumentId,
    ) -> AppResult<i32> {
        sqlx::query_scalar::<_, i32>(
            "INSERT INTO quotation_version_counters (document_id, last_number) VALUES ($1, 1) \
             ON CONFLICT (document_id) DO UPDATE \
             SET last_number = quotation_version_counters.last_number + 1 \
             RETURNING last_number",
        )
        .bind(document_id)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| db_error("Failed to allocate version number", e))
    }

    /// Lock the document's counter row. Returns `false` if the document has
    /// never had a version.
    async fn lock_document(
        tx: &mut Transaction<'_, Postgres>,
        document_id: DocumentId,
    ) -> AppResult<bool> {
        let row: Option<i32> = sqlx::query_scalar(
            "SELECT last_number FROM quotation_version_counters WHERE document_id = $1 FOR UPDATE",
        )
        .bind(document_id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| db_error("Failed to lock document versions", e))?;
        Ok(row.is_some())
    }

    async fn deactivate_all(
        tx: &mut Transaction<'_, Postgres>,
        document_id: DocumentId,
    ) -> AppResult<()> {
        sqlx::query(
            "UPDATE quotation_versions SET is_active = FALSE \
             WHERE document_id = $1 AND is_active",
        )
        .bind(document_id)
        .execute(&mut **tx)
        .await
        .map_err(|e| db_error("Failed to deactivate current version", e))?;
        Ok(())
    }

    async fn insert(&self, new: NewVersion, activate: bool) -> AppResult<Version> {
        new.validate()?;
        // Bound as text and cast, so Postgres keeps the encoded bytes as-is.
        let snapshot_text = serde_json::to_string(&new.snapshot_data)?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        let version_number = Self::allocate_number(&mut tx, new.document_id).await?;

        if activate {
            Self::deactivate_all(&mut tx, new.document_id).await?;
        }

        let version = sqlx::query_as::<_, Version>(
            "INSERT INTO quotation_versions \
             (id, document_id, version_number, version_name, change_reason, is_active, \
              snapshot_data, content_hash, created_by, activated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7::json, $8, $9, CASE WHEN $6 THEN NOW() END) \
             RETURNING *",
        )
        .bind(VersionId::new())
        .bind(new.document_id)
        .bind(version_number)
        .bind(&new.version_name)
        .bind(&new.change_reason)
        .bind(activate)
        .bind(snapshot_text)
        .bind(&new.content_hash)
        .bind(new.created_by)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to insert version", e))?;

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit version", e))?;

        info!(
            document_id = %version.document_id,
            version_id = %version.id,
            version_number = version.version_number,
            active = version.is_active,
            "Version created"
        );
        Ok(version)
    }
}

#[async_trait]
impl VersionStore for PgVersionStore {
    async fn create(&self, new: NewVersion) -> AppResult<Version> {
        self.insert(new, false).await
    }

    async fn create_active(&self, new: NewVersion) -> AppResult<Version> {
        self.insert(new, true).await
    }

    async fn get(&self, id: VersionId) -> AppResult<Version> {
        sqlx::query_as::<_, Version>("SELECT * FROM quotation_versions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to find version", e))?
            .ok_or_else(|| AppError::not_found(format!("Version {id} not found")))
    }

    async fn list_by_document(&self, document_id: DocumentId) -> AppResult<Vec<VersionSummary>> {
        let versions = sqlx::query_as::<_, VersionSummary>(&format!(
            "SELECT {SUMMARY_COLUMNS} FROM quotation_versions \
             WHERE document_id = $1 ORDER BY version_number ASC"
        ))
        .bind(document_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list versions", e))?;

        debug!(document_id = %document_id, count = versions.len(), "Listed versions");
        Ok(versions)
    }

    async fn active_version(&self, document_id: DocumentId) -> AppResult<Option<Version>> {
        sqlx::query_as::<_, Version>(
            "SELECT * FROM quotation_versions WHERE document_id = $1 AND is_active",
        )
        .bind(document_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find active version", e))
    }

    async fn set_active(
        &self,
        document_id: DocumentId,
        version_number: i32,
    ) -> AppResult<Version> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        if !Self::lock_document(&mut tx, document_id).await? {
            return Err(AppError::not_found(format!(
                "Document {document_id} has no versions"
            )));
        }

        let target = sqlx::query_as::<_, Version>(
            "SELECT * FROM quotation_versions \
             WHERE document_id = $1 AND version_number = $2 FOR UPDATE",
        )
        .bind(document_id)
        .bind(version_number)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to find target version", e))?
        .ok_or_else(|| {
            AppError::not_found(format!(
                "Version {version_number} of document {document_id} not found"
            ))
        })?;

        if target.is_active {
            tx.commit()
                .await
                .map_err(|e| db_error("Failed to commit activation", e))?;
            return Ok(target);
        }

        Self::deactivate_all(&mut tx, document_id).await?;

        let activated = sqlx::query_as::<_, Version>(
            "UPDATE quotation_versions SET is_active = TRUE, activated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(target.id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to activate version", e))?;

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit activation", e))?;

        info!(
            document_id = %document_id,
            version_id = %activated.id,
            version_number,
            "Version activated"
        );
        Ok(activated)
    }

    async fn delete(&self, id: VersionId) -> AppResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        let version = sqlx::query_as::<_, VersionSummary>(&format!(
            "SELECT {SUMMARY_COLUMNS} FROM quotation_versions WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to find version", e))?
        .ok_or_else(|| AppError::not_found(format!("Version {id} not found")))?;

        if version.is_active {
            return Err(AppError::conflict(format!(
                "Version {} of document {} is active and cannot be deleted",
                version.version_number, version.document_id
            )));
        }

        sqlx::query("DELETE FROM quotation_versions WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to delete version", e))?;

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit deletion", e))?;

        info!(
            document_id = %version.document_id,
            version_id = %id,
            version_number = version.version_number,
            "Version deleted"
        );
        Ok(())
    }
}
