//! PostgreSQL document owner over the `quotation_documents` table.

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::types::Json;
use tracing::info;

use quotever_core::error::{AppError, ErrorKind};
use quotever_core::result::AppResult;
use quotever_core::types::id::DocumentId;
use quotever_entity::document::DocumentState;

use super::DocumentOwner;
use crate::error::db_error;

/// Reference document owner storing each quotation's live state as one
/// `JSON` value. A single-statement `UPDATE` makes every write atomic.
#[derive(Debug, Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    /// Create a new document store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a document or replace its state.
    pub async fn upsert(&self, document_id: DocumentId, state: &DocumentState) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO quotation_documents (id, state) VALUES ($1, $2::json) \
             ON CONFLICT (id) DO UPDATE SET state = EXCLUDED.state, updated_at = NOW()",
        )
        .bind(document_id)
        .bind(serde_json::to_string(state)?)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to store document", e))?;

        info!(document_id = %document_id, "Document state stored");
        Ok(())
    }
}

#[async_trait]
impl DocumentOwner for PgDocumentStore {
    async fn exists(&self, document_id: DocumentId) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM quotation_documents WHERE id = $1)",
        )
        .bind(document_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("Failed to check document", e))
    }

    async fn read_state(&self, document_id: DocumentId) -> AppResult<DocumentState> {
        let Json(raw): Json<serde_json::Value> =
            sqlx::query_scalar("SELECT state FROM quotation_documents WHERE id = $1")
                .bind(document_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| db_error("Failed to read document", e))?
                .ok_or_else(|| AppError::not_found(format!("Document {document_id} not found")))?;

        DocumentState::try_from(raw).map_err(|e| {
            AppError::with_source(
                ErrorKind::ExternalService,
                format!("Document {document_id} holds malformed state"),
                e,
            )
        })
    }

    async fn write_state(&self, document_id: DocumentId, state: &DocumentState) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE quotation_documents SET state = $2::json, updated_at = NOW() WHERE id = $1",
        )
        .bind(document_id)
        .bind(serde_json::to_string(state)?)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to write document", e))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!(
                "Document {document_id} not found"
            )));
        }
        Ok(())
    }
}
