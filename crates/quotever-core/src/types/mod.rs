//! Core type definitions used across the quotever workspace.

pub mod id;

pub use id::*;
