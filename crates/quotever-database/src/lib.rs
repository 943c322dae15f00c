//! # quotever-database
//!
//! Storage backends for quotation versioning. The [`VersionStore`] trait
//! is the version repository; [`DocumentOwner`] is the contract with the
//! system that owns live quotations. Each has a PostgreSQL implementation
//! and an in-memory implementation for single-node use and tests.

pub mod connection;
pub mod document;
pub mod error;
pub mod store;

pub use connection::DatabasePool;
pub use document::{DocumentOwner, MemoryDocumentStore, PgDocumentStore};
pub use store::{MemoryVersionStore, PgVersionStore, VersionStore};
