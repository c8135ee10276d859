//! The Record type - a stored payload, raw or decoded.

use bytes::Bytes;

use crate::{Codec, Error, Format, Value};

/// What a store hands back for a key.
///
/// Byte-backed engines return `Raw` payloads and leave decoding to the
/// caller's codec, so a scan only pays for decoding the keys it inspects and
/// `get_binary` can return the stored bytes untouched. Value-backed engines
/// return `Parsed`.
#[derive(Clone)]
pub enum Record {
    /// Undecoded bytes with a format hint.
    Raw {
        bytes: Bytes,
        format: Format,
    },

    /// A decoded value.
    Parsed(Value),
}

impl Record {
    pub fn raw(bytes: impl Into<Bytes>, format: Format) -> Self {
        Record::Raw {
            bytes: bytes.into(),
            format,
        }
    }

    pub fn parsed(value: Value) -> Self {
        Record::Parsed(value)
    }

    pub fn is_raw(&self) -> bool {
        matches!(self, Record::Raw { .. })
    }

    /// For `Parsed` records, returns `Format::VALUE`.
    pub fn format(&self) -> Format {
        match self {
            Record::Raw { format, .. } => format.clone(),
            Record::Parsed(_) => Format::VALUE,
        }
    }

    /// Raw bytes, if the record was never decoded.
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Record::Raw { bytes, .. } => Some(bytes),
            Record::Parsed(_) => None,
        }
    }

    /// Decoded value, if already available.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Record::Raw { .. } => None,
            Record::Parsed(v) => Some(v),
        }
    }

    /// Decode into a Value.
    pub fn into_value(self, codec: &dyn Codec) -> Result<Value, Error> {
        match self {
            Record::Parsed(v) => Ok(v),
            Record::Raw { bytes, format } => codec.decode(&bytes, &format),
        }
    }

    /// Serialize into bytes of `target_format`.
    ///
    /// Raw records already in the target format are returned as-is; other
    /// raw records are transcoded through a Value.
    pub fn into_bytes(self, codec: &dyn Codec, target_format: &Format) -> Result<Bytes, Error> {
        match self {
            Record::Raw { bytes, format } if &format == target_format => Ok(bytes),
            Record::Raw { bytes, format } => {
                let value = codec.decode(&bytes, &format)?;
                codec.encode(&value, target_format)
            }
            Record::Parsed(v) => codec.encode(&v, target_format),
        }
    }
}

impl std::fmt::Debug for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Record::Raw { bytes, format } => f
                .debug_struct("Record::Raw")
                .field("bytes_len", &bytes.len())
                .field("format", format)
                .finish(),
            Record::Parsed(v) => f.debug_tuple("Record::Parsed").field(v).finish(),
        }
    }
}

impl From<Value> for Record {
    fn from(v: Value) -> Self {
        Record::Parsed(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NoCodec;

    #[test]
    fn raw_record_inspection() {
        let record = Record::raw(Bytes::from_static(b"{}"), Format::JSON);

        assert!(record.is_raw());
        assert_eq!(record.format(), Format::JSON);
        assert_eq!(record.as_bytes(), Some(&Bytes::from_static(b"{}")));
        assert_eq!(record.as_value(), None);
    }

    #[test]
    fn parsed_record_needs_no_codec() {
        let record = Record::parsed(Value::from("hello"));

        assert!(!record.is_raw());
        assert_eq!(record.format(), Format::VALUE);
        assert_eq!(record.into_value(&NoCodec).unwrap(), Value::from("hello"));
    }

    #[test]
    fn raw_record_in_target_format_skips_codec() {
        let bytes = Bytes::from_static(b"[1,2]");
        let record = Record::raw(bytes.clone(), Format::JSON);

        assert_eq!(record.into_bytes(&NoCodec, &Format::JSON).unwrap(), bytes);
    }

    #[test]
    fn raw_record_without_codec_fails_to_decode() {
        let record = Record::raw(Bytes::from_static(b"[1,2]"), Format::JSON);
        assert!(matches!(
            record.into_value(&NoCodec),
            Err(Error::UnsupportedFormat(_))
        ));
    }
}
