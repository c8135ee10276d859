//! The Value type - a decoded document.
//!
//! Every payload stored in a kvdoc store decodes to a `Value`. It maps
//! directly to JSON, MessagePack, CBOR, etc., but is encoding-agnostic.

use std::collections::BTreeMap;

/// A document stored under a key.
///
/// # Design Notes
///
/// - Uses `BTreeMap` for deterministic field order
/// - Includes `Bytes` for binary data (unlike JSON, but like CBOR/MessagePack)
/// - Keeps `Integer` and `Float` apart but compares them as one numeric kind
///   when matching (see [`Kind`])
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    /// Explicit null.
    #[default]
    Null,
    /// Boolean value.
    Bool(bool),
    /// Signed 64-bit integer.
    Integer(i64),
    /// 64-bit floating point.
    Float(f64),
    /// UTF-8 string.
    String(String),
    /// Binary data.
    Bytes(Vec<u8>),
    /// Ordered sequence of values.
    Array(Vec<Value>),
    /// Map with string keys.
    Map(BTreeMap<String, Value>),
}

/// The runtime kind of a value, as seen by the matcher.
///
/// Scalars split into booleans, numbers and strings. Everything else
/// (null, bytes, arrays, maps) is an object.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kind {
    Boolean,
    Number,
    String,
    Object,
}

impl Value {
    /// Create an empty map.
    pub fn map() -> Self {
        Value::Map(BTreeMap::new())
    }

    /// Create an empty array.
    pub fn array() -> Self {
        Value::Array(Vec::new())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_map(&self) -> bool {
        matches!(self, Value::Map(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    /// Arrays and maps are the only values a query will look at.
    pub fn is_object_shaped(&self) -> bool {
        matches!(self, Value::Array(_) | Value::Map(_))
    }

    pub fn kind(&self) -> Kind {
        match self {
            Value::Bool(_) => Kind::Boolean,
            Value::Integer(_) | Value::Float(_) => Kind::Number,
            Value::String(_) => Kind::String,
            Value::Null | Value::Bytes(_) | Value::Array(_) | Value::Map(_) => Kind::Object,
        }
    }

    /// Numeric view of `Integer` and `Float`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Look up a field of a map. Any other value has no named fields.
    pub fn get(&self, field: &str) -> Option<&Value> {
        match self {
            Value::Map(map) => map.get(field),
            _ => None,
        }
    }

    /// Short human-readable name of the variant, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Array(_) => "array",
            Value::Map(_) => "map",
        }
    }
}

// Conversion from common types

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::Array(v.into_iter().map(Into::into).collect())
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(v: BTreeMap<String, Value>) -> Self {
        Value::Map(v)
    }
}

/// Collect `(field, value)` pairs into a map.
impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Value {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Value::Map(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
