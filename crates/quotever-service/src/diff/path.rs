//! Field path rendering and list identity detection.

use std::collections::HashSet;

use quotever_entity::value::Value;

/// Whether a map key can be written after a `.` without quoting.
fn is_plain_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
}

/// Append a map key to a parent path.
pub(crate) fn child_key(parent: &str, key: &str) -> String {
    if is_plain_key(key) {
        if parent.is_empty() {
            key.to_string()
        } else {
            format!("{parent}.{key}")
        }
    } else {
        format!("{parent}[{}]", quote(key))
    }
}

/// Append a positional list index to a parent path.
pub(crate) fn child_index(parent: &str, index: usize) -> String {
    format!("{parent}[{index}]")
}

/// Append an identity selector such as `[id=42]` to a parent path.
pub(crate) fn child_identity(parent: &str, key: &str, label: &str) -> String {
    format!("{parent}[{key}={label}]")
}

fn quote(raw: &str) -> String {
    serde_json::Value::String(raw.to_string()).to_string()
}

/// Render an identity value: integers bare, strings JSON-quoted.
fn identity_label(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) if n.is_i64() || n.is_u64() => Some(n.to_string()),
        Value::String(s) => Some(quote(s)),
        _ => None,
    }
}

/// Pick the identity key for a list and return it with one label per
/// element, in element order.
///
/// A key qualifies when every element is a map carrying an integer or
/// string under it and no two elements share a value. Keys are tried in
/// the configured order. Empty lists never qualify.
pub(crate) fn identity_labels<'k>(
    items: &[Value],
    identity_keys: &'k [String],
) -> Option<(&'k str, Vec<String>)> {
    if items.is_empty() {
        return None;
    }

    identity_keys.iter().find_map(|key| {
        let labels: Vec<String> = items
            .iter()
            .map(|item| item.as_map()?.get(key.as_str()).and_then(identity_label))
            .collect::<Option<_>>()?;

        let mut seen = HashSet::with_capacity(labels.len());
        labels
            .iter()
            .all(|label| seen.insert(label.as_str()))
            .then_some((key.as_str(), labels))
    })
}
