//! Versioning configuration: diff identity keys and label limits.

use serde::{Deserialize, Serialize};

/// Maximum length of a version label, in characters.
pub const MAX_VERSION_NAME_LENGTH: u64 = 100;

/// Maximum length of a change reason, in characters.
pub const MAX_CHANGE_REASON_LENGTH: u64 = 500;

/// Settings that shape how versions are compared.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersioningConfig {
    /// Object keys that identify list elements across snapshots, tried in
    /// order. A line item carrying `"id": 7` is then diffed as
    /// `items[id=7]` instead of by position.
    #[serde(default = "default_identity_keys")]
    pub identity_keys: Vec<String>,
}

impl Default for VersioningConfig {
    fn default() -> Self {
        Self {
            identity_keys: default_identity_keys(),
        }
    }
}

fn default_identity_keys() -> Vec<String> {
    vec!["id".to_string()]
}
