//! Typed reader and writer extension traits.

use serde::de::DeserializeOwned;
use serde::Serialize;

use kvdoc_core_store::{Codec, Error, Key, Reader, Record, Writer};

use crate::convert::{from_value, to_value};

/// Extension trait for typed reads.
///
/// Implemented for every `Reader`.
///
/// # Example
///
/// ```rust,ignore
/// use kvdoc_serde_store::{key, TypedReader, JsonCodec};
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Settings {
///     debug: bool,
///     port: u16,
/// }
///
/// fn read_settings(store: &mut dyn Reader) -> Result<Settings, Error> {
///     store.read_as(&key!("settings"), &JsonCodec)?
///         .ok_or_else(|| Error::Other { message: "settings not found".into() })
/// }
/// ```
pub trait TypedReader: Reader {
    /// Read a record and deserialize it into a Rust type.
    ///
    /// Raw records are decoded with `codec` first.
    fn read_as<T: DeserializeOwned>(
        &mut self,
        key: &Key,
        codec: &dyn Codec,
    ) -> Result<Option<T>, Error> {
        let Some(record) = self.read(key)? else {
            return Ok(None);
        };

        let value = record.into_value(codec)?;
        Ok(Some(from_value(value)?))
    }

    /// Read a record as a serde_json::Value.
    fn read_json(
        &mut self,
        key: &Key,
        codec: &dyn Codec,
    ) -> Result<Option<serde_json::Value>, Error> {
        self.read_as(key, codec)
    }
}

impl<R: Reader + ?Sized> TypedReader for R {}

/// Extension trait for typed writes.
///
/// Implemented for every `Writer`.
pub trait TypedWriter: Writer {
    /// Serialize a Rust type and write it under `key`.
    fn write_as<T: Serialize>(&mut self, key: &Key, data: &T) -> Result<(), Error> {
        let value = to_value(data)?;
        self.write(key, Record::parsed(value))
    }

    /// Write a serde_json::Value under `key`.
    fn write_json(&mut self, key: &Key, data: serde_json::Value) -> Result<(), Error> {
        self.write_as(key, &data)
    }
}

impl<W: Writer + ?Sized> TypedWriter for W {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::JsonCodec;
    use bytes::Bytes;
    use kvdoc_core_store::{key, Format};
    use serde::{Deserialize, Serialize};
    use std::collections::BTreeMap;

    #[derive(Default)]
    struct TestStore {
        data: BTreeMap<Key, Record>,
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

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct User {
        name: String,
        age: u32,
    }

    #[test]
    fn typed_write_and_read() {
        let mut store = TestStore::default();
        let user = User {
            name: "Alice".to_string(),
            age: 30,
        };

        store.write_as(&key!("users:1"), &user).unwrap();
        let read: Option<User> = store.read_as(&key!("users:1"), &JsonCodec).unwrap();

        assert_eq!(read, Some(user));
    }

    #[test]
    fn typed_read_decodes_raw_records() {
        let mut store = TestStore::default();
        store
            .write(
                &key!("users:2"),
                Record::raw(Bytes::from_static(br#"{"name":"Bob","age":41}"#), Format::JSON),
            )
            .unwrap();

        let read: Option<User> = store.read_as(&key!("users:2"), &JsonCodec).unwrap();
        assert_eq!(
            read,
            Some(User {
                name: "Bob".to_string(),
                age: 41
            })
        );
    }

    #[test]
    fn typed_read_missing_is_none() {
        let mut store = TestStore::default();
        let read: Option<User> = store.read_as(&key!("nobody"), &JsonCodec).unwrap();
        assert!(read.is_none());
    }

    #[test]
    fn json_helpers() {
        let mut store = TestStore::default();
        store
            .write_json(&key!("cfg"), serde_json::json!({"debug": true}))
            .unwrap();

        let read = store.read_json(&key!("cfg"), &JsonCodec).unwrap();
        assert_eq!(read, Some(serde_json::json!({"debug": true})));
    }

    #[test]
    fn typed_read_shape_mismatch_errors() {
        let mut store = TestStore::default();
        store.write_json(&key!("x"), serde_json::json!("text")).unwrap();

        let read: Result<Option<User>, _> = store.read_as(&key!("x"), &JsonCodec);
        assert!(read.is_err());
    }
}
