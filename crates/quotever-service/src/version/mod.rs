//! Version lifecycle orchestration.

mod locks;
pub mod manager;

pub use manager::VersionManager;
