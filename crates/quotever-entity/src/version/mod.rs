//! Version domain entities.

pub mod model;
pub mod snapshot;
pub mod state;

pub use model::{CreateVersionRequest, NewVersion, Version, VersionSummary};
pub use snapshot::SnapshotData;
pub use state::VersionState;
