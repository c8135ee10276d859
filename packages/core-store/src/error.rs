//! Error types for the Core layer.

use crate::format::Format;
use crate::key::{Key, KeyError};

/// Errors at the Core layer.
///
/// These include semantic errors (invalid keys, codec failures, type
/// mismatches) in addition to the engine errors from the LL layer.
///
/// A query that finds nothing is not an error; neither is a single key that
/// fails to load during a scan.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Key validation error.
    #[error("key error: {0}")]
    Key(#[from] KeyError),

    /// A call argument is malformed.
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    /// A key that the operation requires is absent.
    #[error("no value stored for key: {key}")]
    NotFound { key: Key },

    /// The stored value has the wrong type for the operation.
    #[error("value for {key} is {found}, expected {expected}")]
    TypeMismatch {
        key: Key,
        expected: &'static str,
        found: &'static str,
    },

    /// Codec failed to decode bytes.
    #[error("decode error ({format}): {message}")]
    Decode { format: Format, message: String },

    /// Codec failed to encode value.
    #[error("encode error ({format}): {message}")]
    Encode { format: Format, message: String },

    /// Format not supported by codec.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(Format),

    /// A transaction callback gave up; nothing was written.
    #[error("transaction aborted: {message}")]
    Aborted { message: String },

    /// Error from the LL layer.
    #[error("ll error: {0}")]
    Ll(#[from] kvdoc_ll_store::LLError),

    /// Generic error with message.
    #[error("{message}")]
    Other { message: String },
}

impl Error {
    /// Create an invalid-argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Error::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a decode error.
    pub fn decode(format: Format, message: impl Into<String>) -> Self {
        Error::Decode {
            format,
            message: message.into(),
        }
    }

    /// Create an encode error.
    pub fn encode(format: Format, message: impl Into<String>) -> Self {
        Error::Encode {
            format,
            message: message.into(),
        }
    }

    /// Create an abort error, for use inside transaction callbacks.
    pub fn aborted(message: impl Into<String>) -> Self {
        Error::Aborted {
            message: message.into(),
        }
    }
}
