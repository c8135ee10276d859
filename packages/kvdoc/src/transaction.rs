//! Read-your-writes transactions over a store.

use kvdoc_core_store::{Codec, Error, Key, Reader, Store, Value, WriteBatch};

/// Writes staged inside [`Database::transaction`](crate::Database::transaction).
///
/// Nothing reaches the store until the closure returns `Ok`; reads consult the
/// staged writes first. The database lock is held for the closure's whole
/// run, so other callers see either none or all of the writes.
pub struct Transaction<'a> {
    store: &'a mut dyn Store,
    codec: &'a dyn Codec,
    batch: WriteBatch,
}

impl<'a> Transaction<'a> {
    pub(crate) fn new(store: &'a mut dyn Store, codec: &'a dyn Codec) -> Self {
        Self {
            store,
            codec,
            batch: WriteBatch::new(),
        }
    }

    pub(crate) fn into_batch(self) -> WriteBatch {
        self.batch
    }

    pub fn get(&mut self, key: impl AsRef<str>) -> Result<Option<Value>, Error> {
        let key = Key::parse(key.as_ref())?;
        self.get_key(&key)
    }

    pub(crate) fn get_key(&mut self, key: &Key) -> Result<Option<Value>, Error> {
        if let Some(staged) = self.batch.lookup(key) {
            return Ok(staged.cloned());
        }
        match self.store.read(key)? {
            Some(record) => Ok(Some(record.into_value(self.codec)?)),
            None => Ok(None),
        }
    }

    /// Stage a put. `Null` is rejected like [`Database::set`](crate::Database::set).
    pub fn set(&mut self, key: impl AsRef<str>, value: impl Into<Value>) -> Result<(), Error> {
        let key = Key::parse(key.as_ref())?;
        self.set_key(key, value.into())
    }

    pub(crate) fn set_key(&mut self, key: Key, value: Value) -> Result<(), Error> {
        if value.is_null() {
            return Err(Error::invalid_argument(format!("no value given for {key}")));
        }
        self.batch.put(key, value);
        Ok(())
    }

    /// Stage a remove. Returns whether the key existed at this point of the
    /// transaction.
    pub fn remove(&mut self, key: impl AsRef<str>) -> Result<bool, Error> {
        let key = Key::parse(key.as_ref())?;
        let existed = self.get_key(&key)?.is_some();
        self.batch.remove(key);
        Ok(existed)
    }

    pub fn does_exist(&mut self, key: impl AsRef<str>) -> Result<bool, Error> {
        Ok(self.get(key)?.is_some())
    }

    /// Number of staged operations.
    pub fn pending(&self) -> usize {
        self.batch.len()
    }
}
