//! Key type: a validated, non-empty UTF-8 string.

use std::borrow::Borrow;
use std::fmt;

/// Largest key accepted, in bytes. Matches the key-size ceiling of the
/// reference LMDB-style engine.
pub const MAX_KEY_LEN: usize = 1978;

/// Errors related to key validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyError {
    /// The key is the empty string.
    #[error("key must not be empty")]
    Empty,

    /// The key is longer than [`MAX_KEY_LEN`] bytes.
    #[error("key is {len} bytes, limit is {MAX_KEY_LEN}")]
    TooLong { len: usize },

    /// Raw key bytes are not valid UTF-8.
    #[error("key is not valid UTF-8: {raw:?}")]
    NotUtf8 { raw: Vec<u8> },
}

/// A validated key.
///
/// Keys order by their UTF-8 bytes, which is the enumeration order of every
/// engine in this workspace.
#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Key(String);

impl Key {
    /// Parse and validate a key.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use kvdoc_core_store::Key;
    ///
    /// let key = Key::parse("users:42").unwrap();
    /// assert_eq!(key.as_str(), "users:42");
    ///
    /// assert!(Key::parse("").is_err());
    /// ```
    pub fn parse(s: impl Into<String>) -> Result<Self, KeyError> {
        let s = s.into();
        Self::validate(s.as_bytes())?;
        Ok(Key(s))
    }

    /// Decode a key from engine bytes.
    pub fn from_bytes(raw: &[u8]) -> Result<Self, KeyError> {
        Self::validate(raw)?;
        let s = std::str::from_utf8(raw).map_err(|_| KeyError::NotUtf8 { raw: raw.to_vec() })?;
        Ok(Key(s.to_string()))
    }

    fn validate(raw: &[u8]) -> Result<(), KeyError> {
        if raw.is_empty() {
            return Err(KeyError::Empty);
        }
        if raw.len() > MAX_KEY_LEN {
            return Err(KeyError::TooLong { len: raw.len() });
        }
        Ok(())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Check whether this key starts with `prefix`.
    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Key {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for Key {
    type Error = KeyError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Key::parse(s)
    }
}

impl TryFrom<String> for Key {
    type Error = KeyError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Key::parse(s)
    }
}

/// Macro for creating keys from literals.
///
/// # Example
///
/// ```rust
/// use kvdoc_core_store::key;
///
/// let k = key!("users:1");
/// assert_eq!(k.as_str(), "users:1");
/// ```
#[macro_export]
macro_rules! key {
    ($s:expr) => {
        $crate::Key::parse($s).expect("invalid key literal")
    };
}
