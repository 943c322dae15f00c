//! Live document field state, as exchanged with the document owner.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use quotever_core::error::AppError;

use crate::value::Value;

/// The full field state of a quotation at one point in time.
///
/// The version subsystem treats the contents as opaque; only the top-level
/// field names matter, for grouping diff output.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentState {
    fields: BTreeMap<String, Value>,
}

impl DocumentState {
    /// Create an empty document state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a document state from a set of top-level fields.
    pub fn from_fields(fields: BTreeMap<String, Value>) -> Self {
        Self { fields }
    }

    /// Builder-style field setter.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Set a top-level field, returning the previous value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(name.into(), value.into())
    }

    /// Get a top-level field.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Mutable access to a top-level field.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.fields.get_mut(name)
    }

    /// Borrow all top-level fields.
    pub fn fields(&self) -> &BTreeMap<String, Value> {
        &self.fields
    }

    /// View the state as a single map value.
    pub fn to_value(&self) -> Value {
        Value::Map(self.fields.clone())
    }
}

impl TryFrom<serde_json::Value> for DocumentState {
    type Error = AppError;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        match Value::from(value) {
            Value::Map(fields) => Ok(Self { fields }),
            other => Err(AppError::validation(format!(
                "Document state must be an object, got {}",
                other.type_name()
            ))),
        }
    }
}

impl From<DocumentState> for serde_json::Value {
    fn from(state: DocumentState) -> Self {
        Value::Map(state.fields).into()
    }
}
