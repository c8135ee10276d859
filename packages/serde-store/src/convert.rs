//! Conversions between Value and serde types.
//!
//! JSON has no byte strings, so `Value::Bytes` travels as a single-field
//! object `{"$binary": "<base64>"}` and is turned back into bytes on the way
//! in. Non-finite floats have no JSON form and become `null`.

use base64::Engine;
use serde::de::DeserializeOwned;
use serde::Serialize;
use kvdoc_core_store::{Error, Format, Value};

/// Field name marking a base64-encoded byte string.
pub const BINARY_TAG: &str = "$binary";

/// Convert a Value to a Rust type via serde.
pub fn from_value<T: DeserializeOwned>(value: Value) -> Result<T, Error> {
    let json = value_to_json(value);
    serde_json::from_value(json).map_err(|e| Error::decode(Format::VALUE, e.to_string()))
}

/// Convert a Rust type to a Value via serde.
pub fn to_value<T: Serialize>(data: &T) -> Result<Value, Error> {
    let json = serde_json::to_value(data).map_err(|e| Error::encode(Format::VALUE, e.to_string()))?;
    Ok(json_to_value(json))
}

/// Parse JSON text into a Value.
pub fn parse_json(text: &str) -> Result<Value, Error> {
    let json: serde_json::Value =
        serde_json::from_str(text).map_err(|e| Error::decode(Format::JSON, e.to_string()))?;
    Ok(json_to_value(json))
}

/// Convert our Value to serde_json::Value.
pub fn value_to_json(value: Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(b),
        Value::Integer(i) => serde_json::Value::Number(i.into()),
        Value::Float(f) => serde_json::Number::from_f64(f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::String(s) => serde_json::Value::String(s),
        Value::Bytes(b) => {
            let encoded = base64::engine::general_purpose::STANDARD.encode(&b);
            serde_json::json!({ BINARY_TAG: encoded })
        }
        Value::Array(arr) => serde_json::Value::Array(arr.into_iter().map(value_to_json).collect()),
        Value::Map(map) => serde_json::Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, value_to_json(v)))
                .collect(),
        ),
    }
}

/// Convert serde_json::Value to our Value.
pub fn json_to_value(json: serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i)
            } else if let Some(f) = n.as_f64() {
                Value::Float(f)
            } else {
                Value::String(n.to_string())
            }
        }
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(arr) => Value::Array(arr.into_iter().map(json_to_value).collect()),
        serde_json::Value::Object(map) => {
            if let Some(bytes) = tagged_binary(&map) {
                return Value::Bytes(bytes);
            }
            Value::Map(
                map.into_iter()
                    .map(|(k, v)| (k, json_to_value(v)))
                    .collect(),
            )
        }
    }
}

/// Recognize `{"$binary": "<base64>"}`. Anything else stays a map.
fn tagged_binary(map: &serde_json::Map<String, serde_json::Value>) -> Option<Vec<u8>> {
    if map.len() != 1 {
        return None;
    }
    let encoded = map.get(BINARY_TAG)?.as_str()?;
    base64::engine::general_purpose::STANDARD.decode(encoded).ok()
}
