//! Contract with the system that owns live quotations.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use quotever_core::result::AppResult;
use quotever_core::types::id::DocumentId;
use quotever_entity::document::DocumentState;

pub use memory::MemoryDocumentStore;
pub use postgres::PgDocumentStore;

/// Owner of the live, mutable document.
///
/// The version manager reads from it when taking a snapshot and writes to
/// it when rolling back. Nothing else in this workspace mutates live state.
#[async_trait]
pub trait DocumentOwner: Send + Sync + std::fmt::Debug {
    /// Whether the document is known to the owner.
    async fn exists(&self, document_id: DocumentId) -> AppResult<bool>;

    /// Read the document's full current state. Fails with `NotFound` for an
    /// unknown document.
    async fn read_state(&self, document_id: DocumentId) -> AppResult<DocumentState>;

    /// Replace the document's full state.
    ///
    /// Must be all-or-nothing: on error the previous state is still the
    /// visible state.
    async fn write_state(&self, document_id: DocumentId, state: &DocumentState) -> AppResult<()>;
}
