//! In-memory store keeping decoded documents.

use std::collections::BTreeMap;

use kvdoc_core_store::{BatchOp, Error, Key, NoCodec, Reader, Record, Value, WriteBatch, Writer};

/// An in-memory store holding `Value`s in key order.
///
/// Records are stored parsed, so raw records written here must already be
/// decoded; a raw write fails with `UnsupportedFormat`.
///
/// # Example
///
/// ```rust
/// use kvdoc_json_store::InMemoryStore;
/// use kvdoc_core_store::{key, NoCodec, Reader, Record, Value, Writer};
///
/// let mut store = InMemoryStore::new();
/// store.write(&key!("name"), Record::parsed(Value::from("Alice"))).unwrap();
///
/// let record = store.read(&key!("name")).unwrap().unwrap();
/// assert_eq!(record.into_value(&NoCodec).unwrap(), Value::from("Alice"));
/// ```
#[derive(Debug, Default, Clone)]
pub struct InMemoryStore {
    data: BTreeMap<Key, Value>,
}

impl InMemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with initial data.
    pub fn with_data(data: BTreeMap<Key, Value>) -> Self {
        Self { data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl Reader for InMemoryStore {
    fn keys(&mut self) -> Result<Vec<Key>, Error> {
        Ok(self.data.keys().cloned().collect())
    }

    fn read(&mut self, key: &Key) -> Result<Option<Record>, Error> {
        Ok(self.data.get(key).cloned().map(Record::parsed))
    }
}

impl Writer for InMemoryStore {
    fn write(&mut self, key: &Key, data: Record) -> Result<(), Error> {
        let value = data.into_value(&NoCodec)?;
        self.data.insert(key.clone(), value);
        Ok(())
    }

    fn remove(&mut self, key: &Key) -> Result<bool, Error> {
        Ok(self.data.remove(key).is_some())
    }

    fn clear(&mut self) -> Result<(), Error> {
        self.data.clear();
        Ok(())
    }

    // Batch ops carry decoded values, so nothing here can fail halfway.
    fn apply(&mut self, batch: WriteBatch) -> Result<(), Error> {
        for op in batch {
            match op {
                BatchOp::Put { key, value } => {
                    self.data.insert(key, value);
                }
                BatchOp::Remove { key } => {
                    self.data.remove(&key);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use kvdoc_core_store::{key, Format};

    fn read_value(store: &mut InMemoryStore, key: &Key) -> Option<Value> {
        store
            .read(key)
            .unwrap()
            .map(|record| record.into_value(&NoCodec).unwrap())
    }

    #[test]
    fn basic_write_read() {
        let mut store = InMemoryStore::new();

        store
            .write(&key!("foo"), Record::parsed(Value::from("bar")))
            .unwrap();

        assert_eq!(read_value(&mut store, &key!("foo")), Some(Value::from("bar")));
    }

    #[test]
    fn read_nonexistent_returns_none() {
        let mut store = InMemoryStore::new();
        assert!(store.read(&key!("nonexistent")).unwrap().is_none());
    }

    #[test]
    fn overwrite_works() {
        let mut store = InMemoryStore::new();

        store
            .write(&key!("value"), Record::parsed(Value::from("first")))
            .unwrap();
        store
            .write(&key!("value"), Record::parsed(Value::from("second")))
            .unwrap();

        assert_eq!(
            read_value(&mut store, &key!("value")),
            Some(Value::from("second"))
        );
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn keys_are_in_byte_order() {
        let mut store = InMemoryStore::new();
        for k in ["b", "a", "B", "aa"] {
            store
                .write(&Key::parse(k).unwrap(), Record::parsed(Value::Null))
                .unwrap();
        }

        let keys: Vec<String> = store
            .keys()
            .unwrap()
            .into_iter()
            .map(Key::into_string)
            .collect();
        assert_eq!(keys, vec!["B", "a", "aa", "b"]);
    }

    #[test]
    fn raw_records_are_rejected() {
        let mut store = InMemoryStore::new();
        let raw = Record::raw(Bytes::from_static(b"1"), Format::JSON);

        assert!(matches!(
            store.write(&key!("k"), raw),
            Err(Error::UnsupportedFormat(_))
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn batch_and_clear() {
        let mut store = InMemoryStore::new();
        store
            .write(&key!("gone"), Record::parsed(Value::Integer(0)))
            .unwrap();

        let mut batch = WriteBatch::new();
        batch.put(key!("a"), Value::Integer(1));
        batch.put(key!("a"), Value::Integer(2));
        batch.remove(key!("gone"));
        store.apply(batch).unwrap();

        assert_eq!(store.keys().unwrap(), vec![key!("a")]);
        assert_eq!(read_value(&mut store, &key!("a")), Some(Value::Integer(2)));

        store.clear().unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn with_data_constructor() {
        let data: BTreeMap<Key, Value> = [(key!("key"), Value::from("value"))].into();
        let mut store = InMemoryStore::with_data(data);

        assert_eq!(read_value(&mut store, &key!("key")), Some(Value::from("value")));
    }
}
