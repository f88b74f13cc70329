//! Dynamically-typed tool arguments.
//!
//! The model sends tool arguments as a JSON object whose shape is only known
//! to the tool itself. [`Value`] is the tagged union those objects decode
//! into, and [`Arguments`] is the string-keyed map handed to `Tool::execute`.
//!
//! Accessors never default silently: a missing key is
//! [`ArgumentError::Missing`], a key of the wrong type is
//! [`ArgumentError::Invalid`]. The `optional_*` family returns `Ok(None)` only
//! when the key is absent (or explicitly `null`).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ArgumentError;

// ─────────────────────────────────────────────
// Value
// ─────────────────────────────────────────────

/// A single dynamically-typed value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Short type name used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Integral numbers only; `2.5` is not an `i64`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Number(n) if n.fract() == 0.0 && n.is_finite() => Some(*n as i64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Number(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(0.0)),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                Value::Map(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<Value> for serde_json::Value {
    fn from(v: Value) -> Self {
        match v {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(b),
            Value::Number(n) => {
                if n.fract() == 0.0 && n.is_finite() && n.abs() < i64::MAX as f64 {
                    serde_json::Value::from(n as i64)
                } else {
                    serde_json::Number::from_f64(n)
                        .map(serde_json::Value::Number)
                        .unwrap_or(serde_json::Value::Null)
                }
            }
            Value::String(s) => serde_json::Value::String(s),
            Value::List(items) => {
                serde_json::Value::Array(items.into_iter().map(Into::into).collect())
            }
            Value::Map(map) => {
                serde_json::Value::Object(map.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

// ─────────────────────────────────────────────
// Arguments
// ─────────────────────────────────────────────

/// String-keyed argument map passed to a tool.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Arguments(BTreeMap<String, Value>);

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode the JSON-encoded argument string the model sends.
    ///
    /// An empty string decodes to an empty map; anything that is not a
    /// JSON object is rejected.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        if raw.trim().is_empty() {
            return Ok(Self::new());
        }
        serde_json::from_str(raw)
    }

    /// Encode back to the JSON string form used on the wire.
    pub fn to_json(&self) -> String {
        let object: serde_json::Map<String, serde_json::Value> = self
            .0
            .iter()
            .map(|(k, v)| (k.clone(), v.clone().into()))
            .collect();
        serde_json::Value::Object(object).to_string()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    // ────────────── typed accessors ──────────────

    /// Present and non-null, or `Missing`.
    fn present(&self, key: &str) -> Result<&Value, ArgumentError> {
        match self.0.get(key) {
            Some(v) if !v.is_null() => Ok(v),
            _ => Err(ArgumentError::Missing(key.to_string())),
        }
    }

    fn typed<'a, T>(
        &'a self,
        key: &str,
        expected: &'static str,
        extract: impl Fn(&'a Value) -> Option<T>,
    ) -> Result<Option<T>, ArgumentError> {
        match self.0.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(v) => extract(v).map(Some).ok_or_else(|| ArgumentError::Invalid {
                key: key.to_string(),
                expected,
                found: v.kind(),
            }),
        }
    }

    pub fn require_str(&self, key: &str) -> Result<&str, ArgumentError> {
        self.present(key)?;
        self.optional_str(key)?
            .ok_or_else(|| ArgumentError::Missing(key.to_string()))
    }

    pub fn optional_str(&self, key: &str) -> Result<Option<&str>, ArgumentError> {
        self.typed(key, "string", Value::as_str)
    }

    pub fn require_f64(&self, key: &str) -> Result<f64, ArgumentError> {
        self.present(key)?;
        self.optional_f64(key)?
            .ok_or_else(|| ArgumentError::Missing(key.to_string()))
    }

    pub fn optional_f64(&self, key: &str) -> Result<Option<f64>, ArgumentError> {
        self.typed(key, "number", Value::as_f64)
    }

    pub fn require_i64(&self, key: &str) -> Result<i64, ArgumentError> {
        self.present(key)?;
        self.optional_i64(key)?
            .ok_or_else(|| ArgumentError::Missing(key.to_string()))
    }

    pub fn optional_i64(&self, key: &str) -> Result<Option<i64>, ArgumentError> {
        self.typed(key, "integer", Value::as_i64)
    }

    pub fn optional_bool(&self, key: &str) -> Result<Option<bool>, ArgumentError> {
        self.typed(key, "bool", Value::as_bool)
    }

    pub fn require_list(&self, key: &str) -> Result<&[Value], ArgumentError> {
        self.present(key)?;
        self.typed(key, "list", Value::as_list)?
            .ok_or_else(|| ArgumentError::Missing(key.to_string()))
    }

    /// A list whose every element is a string.
    pub fn require_string_list(&self, key: &str) -> Result<Vec<String>, ArgumentError> {
        let items = self.require_list(key)?;
        items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| ArgumentError::Invalid {
                        key: key.to_string(),
                        expected: "list of strings",
                        found: item.kind(),
                    })
            })
            .collect()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Arguments {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Arguments(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_object() {
        let args = Arguments::from_json(r#"{"city": "Hangzhou", "guests": 2, "flex": true}"#).unwrap();
        assert_eq!(args.require_str("city").unwrap(), "Hangzhou");
        assert_eq!(args.optional_i64("guests").unwrap(), Some(2));
        assert_eq!(args.optional_bool("flex").unwrap(), Some(true));
    }

    #[test]
    fn test_from_json_empty_string() {
        let args = Arguments::from_json("  ").unwrap();
        assert!(args.is_empty());
    }

    #[test]
    fn test_from_json_rejects_non_object() {
        assert!(Arguments::from_json("[1, 2]").is_err());
        assert!(Arguments::from_json("\"text\"").is_err());
        assert!(Arguments::from_json("{not json").is_err());
    }

    #[test]
    fn test_require_missing() {
        let args = Arguments::new();
        assert_eq!(
            args.require_str("path"),
            Err(ArgumentError::Missing("path".into()))
        );
    }

    #[test]
    fn test_require_null_is_missing() {
        let args = Arguments::new().with("path", Value::Null);
        assert!(matches!(args.require_str("path"), Err(ArgumentError::Missing(_))));
        assert_eq!(args.optional_str("path").unwrap(), None);
    }

    #[test]
    fn test_wrong_type_is_invalid() {
        let args = Arguments::new().with("path", 42i64);
        let err = args.require_str("path").unwrap_err();
        assert_eq!(
            err,
            ArgumentError::Invalid {
                key: "path".into(),
                expected: "string",
                found: "number",
            }
        );
        assert!(args.optional_str("path").is_err());
    }

    #[test]
    fn test_fractional_is_not_integer() {
        let args = Arguments::new().with("n", 2.5);
        assert!(args.optional_i64("n").is_err());
        assert_eq!(args.optional_f64("n").unwrap(), Some(2.5));
    }

    #[test]
    fn test_string_list() {
        let args = Arguments::new().with("steps", vec!["a", "b"]);
        assert_eq!(args.require_string_list("steps").unwrap(), vec!["a", "b"]);

        let mixed = Arguments::new().with("steps", Value::List(vec!["a".into(), 1i64.into()]));
        assert!(mixed.require_string_list("steps").is_err());
    }

    #[test]
    fn test_to_json_keeps_integers() {
        let args = Arguments::new().with("step_index", 0usize).with("command", "get");
        let raw = args.to_json();
        let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed["step_index"], 0);
        assert_eq!(parsed["command"], "get");
    }

    #[test]
    fn test_nested_map_from_serde_json() {
        let v = Value::from(serde_json::json!({"a": [1, "x", null]}));
        match v {
            Value::Map(map) => {
                let list = map["a"].as_list().unwrap();
                assert_eq!(list[0], Value::Number(1.0));
                assert_eq!(list[1], Value::String("x".into()));
                assert!(list[2].is_null());
            }
            other => panic!("expected map, got {other:?}"),
        }
    }
}
