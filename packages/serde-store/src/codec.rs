//! JSON codec implementation.

use bytes::Bytes;
use kvdoc_core_store::{Codec, Error, Format, Value};

use crate::convert::{json_to_value, value_to_json};

/// The document codec: `Value` to compact JSON bytes and back.
///
/// Byte strings use the `{"$binary": ...}` form described in
/// [`value_to_json`](crate::value_to_json).
///
/// # Example
///
/// ```rust
/// use kvdoc_serde_store::JsonCodec;
/// use kvdoc_core_store::{Codec, Format, Value};
///
/// let codec = JsonCodec;
/// let value = Value::from("hello");
///
/// let bytes = codec.encode(&value, &Format::JSON).unwrap();
/// assert_eq!(&bytes[..], b"\"hello\"");
/// assert_eq!(codec.decode(&bytes, &Format::JSON).unwrap(), value);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn decode(&self, bytes: &Bytes, format: &Format) -> Result<Value, Error> {
        if !self.supports(format) {
            return Err(Error::UnsupportedFormat(format.clone()));
        }

        let json: serde_json::Value = serde_json::from_slice(bytes)
            .map_err(|e| Error::decode(format.clone(), e.to_string()))?;

        Ok(json_to_value(json))
    }

    fn encode(&self, value: &Value, format: &Format) -> Result<Bytes, Error> {
        if !self.supports(format) {
            return Err(Error::UnsupportedFormat(format.clone()));
        }

        let json = value_to_json(value.clone());
        let bytes =
            serde_json::to_vec(&json).map_err(|e| Error::encode(format.clone(), e.to_string()))?;

        Ok(Bytes::from(bytes))
    }

    fn supports(&self, format: &Format) -> bool {
        format.is_json()
    }
}

/// A codec that combines multiple codecs.
///
/// Routes encode/decode to the first registered codec that supports the
/// format.
pub struct MultiCodec {
    codecs: Vec<Box<dyn Codec>>,
}

impl MultiCodec {
    /// Create an empty multi-codec.
    pub fn new() -> Self {
        Self { codecs: Vec::new() }
    }

    /// Register a codec. Earlier registrations win.
    pub fn add(&mut self, codec: impl Codec + 'static) {
        self.codecs.push(Box::new(codec));
    }

    /// Create a multi-codec with the JSON codec included.
    pub fn with_json() -> Self {
        let mut mc = Self::new();
        mc.add(JsonCodec);
        mc
    }

    fn route(&self, format: &Format) -> Result<&dyn Codec, Error> {
        self.codecs
            .iter()
            .find(|c| c.supports(format))
            .map(|c| c.as_ref())
            .ok_or_else(|| Error::UnsupportedFormat(format.clone()))
    }
}

impl Default for MultiCodec {
    fn default() -> Self {
        Self::with_json()
    }
}

impl std::fmt::Debug for MultiCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultiCodec")
            .field("codecs", &self.codecs.len())
            .finish()
    }
}

impl Codec for MultiCodec {
    fn decode(&self, bytes: &Bytes, format: &Format) -> Result<Value, Error> {
        self.route(format)?.decode(bytes, format)
    }

    fn encode(&self, value: &Value, format: &Format) -> Result<Bytes, Error> {
        self.route(format)?.encode(value, format)
    }

    fn supports(&self, format: &Format) -> bool {
        self.codecs.iter().any(|c| c.supports(format))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_codec_roundtrip() {
        let codec = JsonCodec;

        let original: Value = [
            ("name", Value::from("Alice")),
            ("age", Value::Integer(30)),
            ("avatar", Value::Bytes(vec![0xde, 0xad])),
        ]
        .into_iter()
        .collect();

        let bytes = codec.encode(&original, &Format::JSON).unwrap();
        let decoded = codec.decode(&bytes, &Format::JSON).unwrap();

        assert_eq!(original, decoded);
    }

    #[test]
    fn json_codec_rejects_other_formats() {
        let bytes = Bytes::from_static(b"hello");
        let result = JsonCodec.decode(&bytes, &Format::CBOR);

        assert!(matches!(result, Err(Error::UnsupportedFormat(_))));
    }

    #[test]
    fn json_codec_reports_garbage() {
        let bytes = Bytes::from_static(b"{not json");
        let result = JsonCodec.decode(&bytes, &Format::JSON);

        assert!(matches!(result, Err(Error::Decode { .. })));
    }

    #[test]
    fn multi_codec_routes_correctly() {
        let codec = MultiCodec::with_json();

        assert!(codec.supports(&Format::JSON));
        assert!(!codec.supports(&Format::MSGPACK));

        let value = Value::from("hello");
        let bytes = codec.encode(&value, &Format::JSON).unwrap();
        assert_eq!(codec.decode(&bytes, &Format::JSON).unwrap(), value);

        assert!(matches!(
            codec.encode(&value, &Format::MSGPACK),
            Err(Error::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn empty_multi_codec_supports_nothing() {
        let codec = MultiCodec::new();
        assert!(!codec.supports(&Format::JSON));
    }
}
