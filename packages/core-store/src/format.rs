//! Format hints for stored payloads.

use std::borrow::Cow;
use std::fmt;

/// A hint about the encoding of raw bytes.
///
/// Codecs use it to decide whether they can decode a `Record::Raw`, and which
/// encoding to produce when a `Value` is persisted. MIME-type-like strings are
/// used for familiarity.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Format(pub Cow<'static, str>);

impl Format {
    /// JSON (`application/json`)
    pub const JSON: Format = Format(Cow::Borrowed("application/json"));

    /// MessagePack (`application/msgpack`)
    pub const MSGPACK: Format = Format(Cow::Borrowed("application/msgpack"));

    /// CBOR (`application/cbor`)
    pub const CBOR: Format = Format(Cow::Borrowed("application/cbor"));

    /// Opaque binary data (`application/octet-stream`)
    pub const OCTET_STREAM: Format = Format(Cow::Borrowed("application/octet-stream"));

    /// A parsed Value that was never serialized.
    pub const VALUE: Format = Format(Cow::Borrowed("application/x-kvdoc-value"));

    pub const fn from_static(s: &'static str) -> Self {
        Format(Cow::Borrowed(s))
    }

    pub fn new(s: impl Into<String>) -> Self {
        Format(Cow::Owned(s.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_json(&self) -> bool {
        self == &Self::JSON
    }

    /// Check if this is the VALUE format (parsed, never serialized).
    pub fn is_value(&self) -> bool {
        self == &Self::VALUE
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&'static str> for Format {
    fn from(s: &'static str) -> Self {
        Format(Cow::Borrowed(s))
    }
}

impl From<String> for Format {
    fn from(s: String) -> Self {
        Format(Cow::Owned(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constants_work() {
        assert_eq!(Format::JSON.as_str(), "application/json");
        assert!(Format::JSON.is_json());
        assert!(!Format::CBOR.is_json());
        assert!(Format::VALUE.is_value());
    }

    #[test]
    fn owned_and_borrowed_compare_equal() {
        assert_eq!(Format::JSON, Format::from("application/json"));
        assert_eq!(Format::JSON, Format::new("application/json".to_string()));
    }

    #[test]
    fn display_impl() {
        assert_eq!(format!("{}", Format::CBOR), "application/cbor");
        assert_eq!(format!("{}", Format::new("text/html")), "text/html");
    }
}
