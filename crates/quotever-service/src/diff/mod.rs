//! Field-level comparison of two document states.

mod path;

use std::collections::{HashMap, HashSet};

use tracing::debug;

use quotever_core::config::VersioningConfig;
use quotever_entity::change::Change;
use quotever_entity::document::DocumentState;
use quotever_entity::value::Value;

/// Flattened `(path, leaf)` pairs in traversal order.
type Leaves<'a> = Vec<(String, &'a Value)>;

/// Compares document states leaf by leaf.
///
/// Objects are walked key by key; lists are walked by identity key when
/// every element carries a unique one, otherwise by position.
#[derive(Debug, Clone)]
pub struct DiffEngine {
    identity_keys: Vec<String>,
}

impl Default for DiffEngine {
    fn default() -> Self {
        Self::from_config(&VersioningConfig::default())
    }
}

impl DiffEngine {
    /// Create an engine matching list elements by the given keys, tried in
    /// order.
    pub fn new(identity_keys: Vec<String>) -> Self {
        Self { identity_keys }
    }

    /// Create an engine from the versioning configuration.
    pub fn from_config(config: &VersioningConfig) -> Self {
        Self::new(config.identity_keys.clone())
    }

    /// Identity keys in the order they are tried.
    pub fn identity_keys(&self) -> &[String] {
        &self.identity_keys
    }

    /// List the changes that turn `from` into `to`.
    ///
    /// Changes are grouped by top-level field in the order fields appear
    /// in `to`; within a group, additions and modifications come first in
    /// traversal order, then deletions. Fields present only in `from`
    /// follow at the end.
    pub fn compare(&self, from: &DocumentState, to: &DocumentState) -> Vec<Change> {
        let mut changes = Vec::new();

        for (field, new_value) in to.fields() {
            let new_leaves = self.flatten(field, new_value);
            let old_leaves = from
                .get(field)
                .map(|old| self.flatten(field, old))
                .unwrap_or_default();
            diff_group(&old_leaves, &new_leaves, &mut changes);
        }

        for (field, old_value) in from.fields() {
            if to.get(field).is_none() {
                let old_leaves = self.flatten(field, old_value);
                diff_group(&old_leaves, &[], &mut changes);
            }
        }

        debug!(count = changes.len(), "Compared document states");
        changes
    }

    fn flatten<'a>(&self, field: &str, value: &'a Value) -> Leaves<'a> {
        let mut leaves = Vec::new();
        self.walk(path::child_key("", field), value, &mut leaves);
        leaves
    }

    fn walk<'a>(&self, prefix: String, value: &'a Value, out: &mut Leaves<'a>) {
        if value.is_leaf() {
            out.push((prefix, value));
            return;
        }

        match value {
            Value::Map(entries) => {
                for (key, child) in entries {
                    self.walk(path::child_key(&prefix, key), child, out);
                }
            }
            Value::List(items) => match path::identity_labels(items, &self.identity_keys) {
                Some((key, labels)) => {
                    for (item, label) in items.iter().zip(labels) {
                        self.walk(path::child_identity(&prefix, key, &label), item, out);
                    }
                }
                None => {
                    for (index, item) in items.iter().enumerate() {
                        self.walk(path::child_index(&prefix, index), item, out);
                    }
                }
            },
            // Scalars are always leaves.
            _ => out.push((prefix, value)),
        }
    }
}

fn diff_group(old: &[(String, &Value)], new: &[(String, &Value)], out: &mut Vec<Change>) {
    let old_by_path: HashMap<&str, &Value> = old.iter().map(|(p, v)| (p.as_str(), *v)).collect();
    let new_paths: HashSet<&str> = new.iter().map(|(p, _)| p.as_str()).collect();

    for (path, value) in new {
        match old_by_path.get(path.as_str()) {
            None => out.push(Change::added(path.clone(), (*value).clone())),
            Some(previous) if *previous != *value => out.push(Change::modified(
                path.clone(),
                (*previous).clone(),
                (*value).clone(),
            )),
            Some(_) => {}
        }
    }

    for (path, value) in old {
        if !new_paths.contains(path.as_str()) {
            out.push(Change::deleted(path.clone(), (*value).clone()));
        }
    }
}
