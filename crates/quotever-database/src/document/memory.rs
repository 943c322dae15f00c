//! In-memory document owner.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use quotever_core::error::AppError;
use quotever_core::result::AppResult;
use quotever_core::types::id::DocumentId;
use quotever_entity::document::DocumentState;

use super::DocumentOwner;

/// Live documents held in a map. Used in tests and by embedders whose
/// documents already live in process memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocumentStore {
    documents: Arc<RwLock<HashMap<DocumentId, DocumentState>>>,
}

impl MemoryDocumentStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a document.
    pub async fn insert(&self, document_id: DocumentId, state: DocumentState) {
        self.documents.write().await.insert(document_id, state);
    }

    /// Apply an in-place edit to a document, as the owning application would.
    pub async fn update<F>(&self, document_id: DocumentId, edit: F) -> AppResult<()>
    where
        F: FnOnce(&mut DocumentState) + Send,
    {
        let mut documents = self.documents.write().await;
        let state = documents
            .get_mut(&document_id)
            .ok_or_else(|| AppError::not_found(format!("Document {document_id} not found")))?;
        edit(state);
        Ok(())
    }
}

#[async_trait]
impl DocumentOwner for MemoryDocumentStore {
    async fn exists(&self, document_id: DocumentId) -> AppResult<bool> {
        Ok(self.documents.read().await.contains_key(&document_id))
    }

    async fn read_state(&self, document_id: DocumentId) -> AppResult<DocumentState> {
        self.documents
            .read()
            .await
            .get(&document_id)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Document {document_id} not found")))
    }

    async fn write_state(&self, document_id: DocumentId, state: &DocumentState) -> AppResult<()> {
        let mut documents = self.documents.write().await;
        let slot = documents
            .get_mut(&document_id)
            .ok_or_else(|| AppError::not_found(format!("Document {document_id} not found")))?;
        *slot = state.clone();
        Ok(())
    }
}
