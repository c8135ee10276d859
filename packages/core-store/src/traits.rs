//! Core traits: Reader, Writer, Codec.

use bytes::Bytes;

use crate::{BatchOp, Error, Format, Key, Record, Value, WriteBatch};

/// Read records by key.
///
/// # Object Safety
///
/// This trait is object-safe: you can use `Box<dyn Reader>`.
pub trait Reader: Send + Sync {
    /// Enumerate every key in the store's enumeration order.
    ///
    /// The list is a snapshot; keys removed afterwards may no longer be
    /// readable.
    fn keys(&mut self) -> Result<Vec<Key>, Error>;

    /// Read the record stored under `key`.
    ///
    /// # Returns
    ///
    /// * `Ok(None)` - The key does not exist.
    /// * `Ok(Some(record))` - The stored record.
    /// * `Err(Error)` - An error occurred.
    fn read(&mut self, key: &Key) -> Result<Option<Record>, Error>;
}

/// Write records by key.
///
/// # Object Safety
///
/// This trait is object-safe: you can use `Box<dyn Writer>`.
pub trait Writer: Send + Sync {
    /// Store `data` under `key`, replacing any previous record.
    fn write(&mut self, key: &Key, data: Record) -> Result<(), Error>;

    /// Delete `key`. Returns whether it existed.
    fn remove(&mut self, key: &Key) -> Result<bool, Error>;

    /// Delete every key.
    fn clear(&mut self) -> Result<(), Error>;

    /// Apply a batch of writes.
    ///
    /// The default implementation writes one operation at a time. Stores
    /// whose individual writes can fail must override it to keep the batch
    /// all-or-nothing.
    fn apply(&mut self, batch: WriteBatch) -> Result<(), Error> {
        for op in batch {
            match op {
                BatchOp::Put { key, value } => self.write(&key, Record::parsed(value))?,
                BatchOp::Remove { key } => {
                    self.remove(&key)?;
                }
            }
        }
        Ok(())
    }
}

/// Combined read/write at the Core level.
pub trait Store: Reader + Writer {}
impl<T: Reader + Writer> Store for T {}

/// Codec for converting between Value and bytes.
///
/// # Implementing Custom Codecs
///
/// ```rust
/// use kvdoc_core_store::{Codec, Value, Format, Error};
/// use bytes::Bytes;
///
/// struct Utf8Codec;
///
/// impl Codec for Utf8Codec {
///     fn decode(&self, bytes: &Bytes, format: &Format) -> Result<Value, Error> {
///         let text = std::str::from_utf8(bytes)
///             .map_err(|e| Error::decode(format.clone(), e.to_string()))?;
///         Ok(Value::from(text))
///     }
///
///     fn encode(&self, value: &Value, format: &Format) -> Result<Bytes, Error> {
///         match value.as_str() {
///             Some(s) => Ok(Bytes::copy_from_slice(s.as_bytes())),
///             None => Err(Error::encode(format.clone(), "only strings are supported")),
///         }
///     }
///
///     fn supports(&self, format: &Format) -> bool {
///         format.as_str() == "text/plain"
///     }
/// }
/// ```
pub trait Codec: Send + Sync {
    /// Decode raw bytes into a Value.
    fn decode(&self, bytes: &Bytes, format: &Format) -> Result<Value, Error>;

    /// Encode a Value into raw bytes.
    fn encode(&self, value: &Value, format: &Format) -> Result<Bytes, Error>;

    /// Check if this codec supports a format.
    fn supports(&self, format: &Format) -> bool;
}

/// A codec that doesn't support any formats.
///
/// For stores that only ever hand out parsed records.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCodec;

impl Codec for NoCodec {
    fn decode(&self, _bytes: &Bytes, format: &Format) -> Result<Value, Error> {
        Err(Error::UnsupportedFormat(format.clone()))
    }

    fn encode(&self, _value: &Value, format: &Format) -> Result<Bytes, Error> {
        Err(Error::UnsupportedFormat(format.clone()))
    }

    fn supports(&self, _format: &Format) -> bool {
        false
    }
}

// Blanket implementations for references and boxes

impl<T: Reader + ?Sized> Reader for &mut T {
    fn keys(&mut self) -> Result<Vec<Key>, Error> {
        (*self).keys()
    }

    fn read(&mut self, key: &Key) -> Result<Option<Record>, Error> {
        (*self).read(key)
    }
}

impl<T: Writer + ?Sized> Writer for &mut T {
    fn write(&mut self, key: &Key, data: Record) -> Result<(), Error> {
        (*self).write(key, data)
    }

    fn remove(&mut self, key: &Key) -> Result<bool, Error> {
        (*self).remove(key)
    }

    fn clear(&mut self) -> Result<(), Error> {
        (*self).clear()
    }

    fn apply(&mut self, batch: WriteBatch) -> Result<(), Error> {
        (*self).apply(batch)
    }
}

impl<T: Reader + ?Sized> Reader for Box<T> {
    fn keys(&mut self) -> Result<Vec<Key>, Error> {
        self.as_mut().keys()
    }

    fn read(&mut self, key: &Key) -> Result<Option<Record>, Error> {
        self.as_mut().read(key)
    }
}

impl<T: Writer + ?Sized> Writer for Box<T> {
    fn write(&mut self, key: &Key, data: Record) -> Result<(), Error> {
        self.as_mut().write(key, data)
    }

    fn remove(&mut self, key: &Key) -> Result<bool, Error> {
        self.as_mut().remove(key)
    }

    fn clear(&mut self) -> Result<(), Error> {
        self.as_mut().clear()
    }

    fn apply(&mut self, batch: WriteBatch) -> Result<(), Error> {
        self.as_mut().apply(batch)
    }
}

impl<T: Codec + ?Sized> Codec for Box<T> {
    fn decode(&self, bytes: &Bytes, format: &Format) -> Result<Value, Error> {
        self.as_ref().decode(bytes, format)
    }

    fn encode(&self, value: &Value, format: &Format) -> Result<Bytes, Error> {
        self.as_ref().encode(value, format)
    }

    fn supports(&self, format: &Format) -> bool {
        self.as_ref().supports(format)
    }
}

impl<T: Codec + ?Sized> Codec for std::sync::Arc<T> {
    fn decode(&self, bytes: &Bytes, format: &Format) -> Result<Value, Error> {
        self.as_ref().decode(bytes, format)
    }

    fn encode(&self, value: &Value, format: &Format) -> Result<Bytes, Error> {
        self.as_ref().encode(value, format)
    }

    fn supports(&self, format: &Format) -> bool {
        self.as_ref().supports(format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key;
    use std::collections::BTreeMap;

    /// Simple in-memory store for testing.
    struct TestStore {
        data: BTreeMap<Key, Record>,
    }

    impl TestStore {
        fn new() -> Self {
            Self {
                data: BTreeMap::new(),
            }
        }
    }

    impl Reader for TestStore {
        fn keys(&mut self) -> Result<Vec<Key>, Error> {
            Ok(self.data.keys().cloned().collect())
        }

        fn read(&mut self, key: &Key) -> Result<Option<Record>, Error> {
            Ok(self.data.get(key).cloned())
        }
    }

    impl Writer for TestStore {
        fn write(&mut self, key: &Key, data: Record) -> Result<(), Error> {
            self.data.insert(key.clone(), data);
            Ok(())
        }

        fn remove(&mut self, key: &Key) -> Result<bool, Error> {
            Ok(self.data.remove(key).is_some())
        }

        fn clear(&mut self) -> Result<(), Error> {
            self.data.clear();
            Ok(())
        }
    }

    #[test]
    fn basic_store_works() {
        let mut store = TestStore::new();

        store
            .write(&key!("users:123"), Record::parsed(Value::from("Alice")))
            .unwrap();

        let result = store.read(&key!("users:123")).unwrap();
        assert!(result.is_some());
        assert_eq!(store.keys().unwrap(), vec![key!("users:123")]);
    }

    #[test]
    fn default_apply_writes_in_order() {
        let mut store = TestStore::new();
        store
            .write(&key!("stale"), Record::parsed(Value::Null))
            .unwrap();

        let mut batch = WriteBatch::new();
        batch.put(key!("a"), Value::from(1i64));
        batch.remove(key!("stale"));
        store.apply(batch).unwrap();

        assert_eq!(store.keys().unwrap(), vec![key!("a")]);
    }

    #[test]
    fn object_safety_works() {
        let mut store = TestStore::new();
        let boxed: &mut dyn Store = &mut store;

        boxed
            .write(&key!("test"), Record::parsed(Value::from("hello")))
            .unwrap();
        assert!(boxed.read(&key!("test")).unwrap().is_some());
        assert!(boxed.remove(&key!("test")).unwrap());
        assert!(boxed.read(&key!("test")).unwrap().is_none());
    }

    #[test]
    fn no_codec_supports_nothing() {
        assert!(!NoCodec.supports(&Format::JSON));
        assert!(NoCodec
            .decode(&Bytes::from_static(b"1"), &Format::JSON)
            .is_err());
    }
}
