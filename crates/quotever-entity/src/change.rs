//! Field-level change between two snapshots.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::value::Value;

/// Kind of difference found at one field path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    /// Present only in the newer snapshot.
    Added,
    /// Present in both with different values.
    Modified,
    /// Present only in the older snapshot.
    Deleted,
}

impl ChangeType {
    /// The change type seen from the opposite direction.
    pub fn inverse(&self) -> Self {
        match self {
            Self::Added => Self::Deleted,
            Self::Modified => Self::Modified,
            Self::Deleted => Self::Added,
        }
    }

    /// Return the change type as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Modified => "modified",
            Self::Deleted => "deleted",
        }
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One difference between two snapshots. Not persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Change {
    /// Path of the field, e.g. `items[id=7].unitPrice`.
    pub field_name: String,
    /// Kind of change.
    pub change_type: ChangeType,
    /// Value in the older snapshot; `None` for additions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_value: Option<Value>,
    /// Value in the newer snapshot; `None` for deletions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_value: Option<Value>,
    /// Human-readable summary.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Change {
    /// A field present only in the newer snapshot.
    pub fn added(field_name: impl Into<String>, new_value: Value) -> Self {
        Self::build(field_name.into(), ChangeType::Added, None, Some(new_value))
    }

    /// A field present only in the older snapshot.
    pub fn deleted(field_name: impl Into<String>, old_value: Value) -> Self {
        Self::build(field_name.into(), ChangeType::Deleted, Some(old_value), None)
    }

    /// A field whose value differs.
    pub fn modified(field_name: impl Into<String>, old_value: Value, new_value: Value) -> Self {
        Self::build(
            field_name.into(),
            ChangeType::Modified,
            Some(old_value),
            Some(new_value),
        )
    }

    /// The same change seen from the opposite direction.
    pub fn inverse(&self) -> Self {
        Self::build(
            self.field_name.clone(),
            self.change_type.inverse(),
            self.new_value.clone(),
            self.old_value.clone(),
        )
    }

    fn build(
        field_name: String,
        change_type: ChangeType,
        old_value: Option<Value>,
        new_value: Option<Value>,
    ) -> Self {
        let description = match (&old_value, &new_value) {
            (None, Some(new)) => format!("{field_name} added with {new}"),
            (Some(old), None) => format!("{field_name} removed (was {old})"),
            (Some(old), Some(new)) => format!("{field_name} changed from {old} to {new}"),
            (None, None) => field_name.clone(),
        };
        Self {
            field_name,
            change_type,
            old_value,
            new_value,
            description: Some(description),
        }
    }
}
