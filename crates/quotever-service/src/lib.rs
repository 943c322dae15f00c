//! # quotever-service
//!
//! Business logic for quotation version control: the snapshot codec, the
//! field-level diff engine, and the [`VersionManager`] that drives the
//! version lifecycle over the storage traits in `quotever-database`.

pub mod codec;
pub mod diff;
pub mod version;

pub use codec::SnapshotError;
pub use diff::DiffEngine;
pub use version::VersionManager;
