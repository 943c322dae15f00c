//! Append-only version repository.
//!
//! Provides the version store using either:
//! - PostgreSQL (row lock on a per-document counter, for shared deployments)
//! - In-memory mutex (for single-node deployments and tests)

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use quotever_core::result::AppResult;
use quotever_core::types::id::{DocumentId, VersionId};
use quotever_entity::version::{NewVersion, Version, VersionSummary};

pub use memory::MemoryVersionStore;
pub use postgres::PgVersionStore;

/// Durable store of version records.
///
/// Every method is one atomic unit: either all of its effects become
/// visible or none do. Implementations guarantee that no reader ever
/// observes two active versions for a document, and that once a document
/// has an active version it always has exactly one.
#[async_trait]
pub trait VersionStore: Send + Sync + std::fmt::Debug {
    /// Insert a new inactive version, allocating the next version number
    /// for its document.
    ///
    /// Fails with `Validation` if the label or reason is too long.
    async fn create(&self, new: NewVersion) -> AppResult<Version>;

    /// Insert a new version and make it the document's active version in
    /// the same transaction.
    async fn create_active(&self, new: NewVersion) -> AppResult<Version>;

    /// Fetch a version by id. Fails with `NotFound` if absent.
    async fn get(&self, id: VersionId) -> AppResult<Version>;

    /// List version metadata for a document, ascending by number.
    async fn list_by_document(&self, document_id: DocumentId) -> AppResult<Vec<VersionSummary>>;

    /// The document's active version, if one has been chosen.
    async fn active_version(&self, document_id: DocumentId) -> AppResult<Option<Version>>;

    /// Deactivate the current active version and activate the target, as
    /// one transaction. Returns the newly active version.
    ///
    /// Fails with `NotFound` if the document has no such version.
    async fn set_active(&self, document_id: DocumentId, version_number: i32)
    -> AppResult<Version>;

    /// Permanently remove a version. Fails with `Conflict` if it is active.
    /// Sibling version numbers are never changed.
    async fn delete(&self, id: VersionId) -> AppResult<()>;
}
