//! Render arguments: the per-request variable bag handed to every template.
//!
//! [`RenderArgs`] is owned by the request's controller for the lifetime of the
//! request. Values are stored as [`minijinja::Value`] so that plain serializable
//! data and engine objects (such as [`ContentForItems`](crate::ContentForItems))
//! can live side by side.
//!
//! Arguments are always named by the caller. Build them one at a time with
//! [`RenderArgs::with`], from a serializable struct with
//! [`RenderArgs::from_serialize`], or from a list of declared names plus values
//! with [`RenderArgs::zip`].
//!
//! # Example
//!
//! ```rust
//! use contentfor_render::RenderArgs;
//!
//! let args = RenderArgs::new()
//!     .with("title", "Hotels")
//!     .with("count", 3);
//!
//! assert_eq!(args.len(), 2);
//! assert!(args.contains_key("title"));
//! ```

use std::collections::BTreeMap;

use minijinja::Value;
use serde::Serialize;

use crate::error::RenderError;

/// Named values available to templates during a render.
#[derive(Debug, Clone, Default)]
pub struct RenderArgs {
    values: BTreeMap<String, Value>,
}

impl RenderArgs {
    /// Creates an empty argument map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds arguments from a serializable struct or map.
    ///
    /// Each top-level field becomes one argument.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::ContextError`] if `data` does not serialize to a map.
    pub fn from_serialize<T: Serialize>(data: &T) -> Result<Self, RenderError> {
        match serde_json::to_value(data)? {
            serde_json::Value::Object(map) => Ok(Self {
                values: map
                    .into_iter()
                    .map(|(key, value)| (key, Value::from_serialize(&value)))
                    .collect(),
            }),
            other => Err(RenderError::ContextError(format!(
                "render arguments must serialize to a map, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Pairs declared argument names with values, in order.
    ///
    /// When the counts differ nothing is added; the mismatch is logged as a
    /// warning and the render carries on without these values.
    pub fn zip<S: AsRef<str>>(names: &[S], values: Vec<Value>) -> Self {
        if names.len() != values.len() {
            tracing::warn!(
                names = names.len(),
                values = values.len(),
                "render argument names found for a different number of values"
            );
            return Self::new();
        }
        Self {
            values: names
                .iter()
                .map(|name| name.as_ref().to_string())
                .zip(values)
                .collect(),
        }
    }

    /// Adds a serializable value and returns `self` for chaining.
    pub fn with(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        self.insert(key, value);
        self
    }

    /// Inserts a serializable value, replacing any previous value for `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Serialize) -> Option<Value> {
        self.values
            .insert(key.into(), Value::from_serialize(&value))
    }

    /// Inserts an engine value as-is.
    pub fn insert_value(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.values.insert(key.into(), value)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Merges `other` into `self`; values from `other` win.
    pub fn extend(&mut self, other: RenderArgs) {
        self.values.extend(other.values);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Converts the arguments into the root value passed to the engine.
    pub fn to_value(&self) -> Value {
        Value::from(self.values.clone())
    }

    /// Returns a copy of the arguments with one extra entry.
    pub(crate) fn with_entry(&self, key: &str, value: Value) -> Value {
        let mut values = self.values.clone();
        values.insert(key.to_string(), value);
        Value::from(values)
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "a sequence",
        serde_json::Value::Object(_) => "a map",
    }
}
