//! Semantic deep equality.
//!
//! Objects are compared through their serialized value trees. Before
//! comparison, object members that are `null` or empty arrays are dropped,
//! recursively, so an unset list equals an empty one. An empty object is
//! kept: in the value tree an empty map and an empty struct look the same,
//! and `Some(empty struct)` must not equal `None`. Types whose optional maps
//! should compare equal to empty ones either skip empty maps when
//! serializing (as `ObjectMeta` does) or opt in through
//! [`Normalization::empty_objects_as_unset`]. Everything else must match
//! exactly.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

/// Where two values first differ.
#[derive(Debug, Clone, PartialEq)]
pub struct Divergence {
    /// Dotted path, e.g. `spec.conditions[0].reason`; empty for the root.
    pub path: String,
    pub expected: Value,
    pub actual: Value,
}

impl fmt::Display for Divergence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = if self.path.is_empty() { "<root>" } else { &self.path };
        write!(f, "{}: expected {}, got {}", path, self.expected, self.actual)
    }
}

/// Which empty members count as unset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Normalization {
    /// Also drop `{}` members. Off by default.
    pub empty_objects_as_unset: bool,
}

impl Normalization {
    /// Drops empty members from every object in the tree.
    pub fn apply(self, value: Value) -> Value {
        match value {
            Value::Object(fields) => Value::Object(
                fields
                    .into_iter()
                    .map(|(k, v)| (k, self.apply(v)))
                    .filter(|(_, v)| !self.is_unset(v))
                    .collect(),
            ),
            Value::Array(items) => Value::Array(items.into_iter().map(|v| self.apply(v)).collect()),
            other => other,
        }
    }

    fn is_unset(self, value: &Value) -> bool {
        match value {
            Value::Null => true,
            Value::Array(items) => items.is_empty(),
            Value::Object(fields) => self.empty_objects_as_unset && fields.is_empty(),
            _ => false,
        }
    }

    /// Serializes `value` and normalizes the result.
    pub fn to_normalized<T: Serialize + ?Sized>(self, value: &T) -> Result<Value, serde_json::Error> {
        serde_json::to_value(value).map(|v| self.apply(v))
    }

    pub fn semantic_eq<A, B>(self, a: &A, b: &B) -> Result<bool, serde_json::Error>
    where
        A: Serialize + ?Sized,
        B: Serialize + ?Sized,
    {
        Ok(self.to_normalized(a)? == self.to_normalized(b)?)
    }

    pub fn first_divergence<A, B>(self, expected: &A, actual: &B) -> Result<Option<Divergence>, serde_json::Error>
    where
        A: Serialize + ?Sized,
        B: Serialize + ?Sized,
    {
        let (a, b) = (self.to_normalized(expected)?, self.to_normalized(actual)?);
        Ok(walk(String::new(), &a, &b))
    }
}

/// [`Normalization::to_normalized`] with the default rules.
pub fn to_normalized<T: Serialize + ?Sized>(value: &T) -> Result<Value, serde_json::Error> {
    Normalization::default().to_normalized(value)
}

/// [`Normalization::apply`] with the default rules.
pub fn normalize(value: Value) -> Value {
    Normalization::default().apply(value)
}

pub fn semantic_eq<A, B>(a: &A, b: &B) -> Result<bool, serde_json::Error>
where
    A: Serialize + ?Sized,
    B: Serialize + ?Sized,
{
    Normalization::default().semantic_eq(a, b)
}

/// The first point at which `expected` and `actual` differ semantically.
pub fn first_divergence<A, B>(expected: &A, actual: &B) -> Result<Option<Divergence>, serde_json::Error>
where
    A: Serialize + ?Sized,
    B: Serialize + ?Sized,
{
    Normalization::default().first_divergence(expected, actual)
}

fn walk(path: String, a: &Value, b: &Value) -> Option<Divergence> {
    match (a, b) {
        (Value::Object(x), Value::Object(y)) => walk_objects(&path, x, y),
        (Value::Array(x), Value::Array(y)) => {
            for (i, (l, r)) in x.iter().zip(y).enumerate() {
                if let Some(d) = walk(format!("{}[{}]", path, i), l, r) {
                    return Some(d);
                }
            }
            let n = x.len().min(y.len());
            (x.len() != y.len()).then(|| Divergence {
                path: format!("{}[{}]", path, n),
                expected: x.get(n).cloned().unwrap_or(Value::Null),
                actual: y.get(n).cloned().unwrap_or(Value::Null),
            })
        }
        _ => (a != b).then(|| Divergence { path, expected: a.clone(), actual: b.clone() }),
    }
}

fn walk_objects(path: &str, a: &Map<String, Value>, b: &Map<String, Value>) -> Option<Divergence> {
    let keys: BTreeSet<&String> = a.keys().chain(b.keys()).collect();
    keys.into_iter().find_map(|key| {
        let child = if path.is_empty() { key.clone() } else { format!("{}.{}", path, key) };
        walk(child, a.get(key).unwrap_or(&Value::Null), b.get(key).unwrap_or(&Value::Null))
    })
}

/// Side-by-side diff of the debug forms of two values.
pub fn diff<A, B>(expected: &A, actual: &B) -> String
where
    A: fmt::Debug + ?Sized,
    B: fmt::Debug + ?Sized,
{
    pretty_assertions::Comparison::new(expected, actual).to_string()
}
