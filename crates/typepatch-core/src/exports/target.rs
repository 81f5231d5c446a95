//! The recursive export target tree.

use indexmap::IndexMap;
use serde_json::Value;

/// Condition key that holds a type-declaration path.
pub const TYPES_CONDITION: &str = "types";

/// Condition key used as the generic fallback.
pub const DEFAULT_CONDITION: &str = "default";

/// A single `exports` value: a path, a fallback list, or a condition map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportTarget {
    /// `"./dist/index.js"`
    Literal(String),
    /// `["./a.js", "./b.js"]`, tried left to right.
    List(Vec<ExportTarget>),
    /// `{ "import": ..., "require": ... }`, in manifest order.
    Conditional(IndexMap<String, ExportTarget>),
}

impl ExportTarget {
    /// Build a target from raw JSON.
    ///
    /// `null`, booleans and numbers carry no path and become an empty list,
    /// which resolves to nothing.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::String(s) => Self::Literal(s.clone()),
            Value::Array(items) => Self::List(items.iter().map(Self::from_value).collect()),
            Value::Object(map) => Self::Conditional(
                map.iter()
                    .map(|(k, v)| (k.clone(), Self::from_value(v)))
                    .collect(),
            ),
            Value::Null | Value::Bool(_) | Value::Number(_) => Self::List(Vec::new()),
        }
    }

    /// Convert back to JSON, preserving condition order.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Literal(s) => Value::String(s.clone()),
            Self::List(items) => Value::Array(items.iter().map(Self::to_value).collect()),
            Self::Conditional(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_value()))
                    .collect(),
            ),
        }
    }

    #[must_use]
    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Self::Literal(s) => Some(s),
            _ => None,
        }
    }

    /// Structure-preserving map over every string leaf.
    #[must_use]
    pub fn map_leaves<F>(&self, f: &F) -> Self
    where
        F: Fn(&str) -> String,
    {
        match self {
            Self::Literal(s) => Self::Literal(f(s)),
            Self::List(items) => Self::List(items.iter().map(|t| t.map_leaves(f)).collect()),
            Self::Conditional(map) => Self::Conditional(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.map_leaves(f)))
                    .collect(),
            ),
        }
    }

    /// Every string leaf, depth-first in manifest order.
    #[must_use]
    pub fn leaves(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::Literal(s) => out.push(s),
            Self::List(items) => items.iter().for_each(|t| t.collect_leaves(out)),
            Self::Conditional(map) => map.values().for_each(|t| t.collect_leaves(out)),
        }
    }

    /// The `types` leaf sitting directly on this node.
    ///
    /// For a condition map that is its literal `types` entry; for a list it is
    /// the first element that has one. Literals never carry a `types` leaf.
    #[must_use]
    pub fn types_leaf(&self) -> Option<&str> {
        match self {
            Self::Literal(_) => None,
            Self::List(items) => items.iter().find_map(Self::types_leaf),
            Self::Conditional(map) => map
                .get(TYPES_CONDITION)
                .and_then(Self::as_literal)
                .filter(|s| !s.is_empty()),
        }
    }
}

impl From<&str> for ExportTarget {
    fn from(path: &str) -> Self {
        Self::Literal(path.to_string())
    }
}
