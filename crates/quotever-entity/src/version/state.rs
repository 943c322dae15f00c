//! Version lifecycle state.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a version, derived from `is_active` and
/// `activated_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionState {
    /// Created and never activated.
    Draft,
    /// The document's canonical version.
    Active,
    /// Was active, displaced by a later activation.
    Superseded,
}

impl VersionState {
    /// Derive the state from the stored flags.
    pub fn derive(is_active: bool, ever_activated: bool) -> Self {
        match (is_active, ever_activated) {
            (true, _) => Self::Active,
            (false, true) => Self::Superseded,
            (false, false) => Self::Draft,
        }
    }

    /// Return the state as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Active => "active",
            Self::Superseded => "superseded",
        }
    }
}

impl fmt::Display for VersionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
