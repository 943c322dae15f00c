//! # quotever-entity
//!
//! Domain entity models for quotation version control. Version records
//! are database rows and derive `sqlx::FromRow`; snapshot values and
//! changes are value objects produced by the codec and the diff engine.

pub mod change;
pub mod document;
pub mod value;
pub mod version;

pub use change::{Change, ChangeType};
pub use document::DocumentState;
pub use value::Value;
pub use version::{
    CreateVersionRequest, NewVersion, SnapshotData, Version, VersionState, VersionSummary,
};
