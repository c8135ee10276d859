//! Bridge from the LL layer to the Core layer.
//!
//! Wrap an `LLStore` to get a Core `Store`:
//!
//! ```rust,ignore
//! let engine = LocalDiskStore::open(dir)?;
//! let store = LLToCore::new(engine, JsonCodec, Format::JSON);
//! // Now use store as a Reader/Writer
//! ```

use kvdoc_ll_store::{LLBatch, LLReader, LLWriter};

use crate::{BatchOp, Codec, Error, Format, Key, Reader, Record, WriteBatch, Writer};

/// Adapts an LL store to the Core Store interface.
///
/// This bridge:
/// - Validates enumerated key bytes as `Key`s, skipping any that fail
/// - Wraps returned bytes as `Record::Raw` with the configured format
/// - Encodes `Record`s and batches to bytes for writes
pub struct LLToCore<T, C> {
    inner: T,
    codec: C,
    format: Format,
}

impl<T, C> LLToCore<T, C> {
    pub fn new(inner: T, codec: C, format: Format) -> Self {
        Self {
            inner,
            codec,
            format,
        }
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    pub fn format(&self) -> &Format {
        &self.format
    }

    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: LLReader, C: Send + Sync> Reader for LLToCore<T, C> {
    fn keys(&mut self) -> Result<Vec<Key>, Error> {
        let raw = self.inner.ll_keys()?;
        let mut keys = Vec::with_capacity(raw.len());
        for bytes in raw {
            match Key::from_bytes(&bytes) {
                Ok(key) => keys.push(key),
                Err(e) => tracing::warn!(error = %e, "skipping undecodable key"),
            }
        }
        Ok(keys)
    }

    fn read(&mut self, key: &Key) -> Result<Option<Record>, Error> {
        let bytes = match self.inner.ll_get(key.as_bytes())? {
            Some(b) => b,
            None => return Ok(None),
        };

        Ok(Some(Record::raw(bytes, self.format.clone())))
    }
}

impl<T: LLWriter, C: Codec> Writer for LLToCore<T, C> {
    fn write(&mut self, key: &Key, data: Record) -> Result<(), Error> {
        let bytes = data.into_bytes(&self.codec, &self.format)?;
        self.inner.ll_put(key.as_bytes(), bytes)?;
        Ok(())
    }

    fn remove(&mut self, key: &Key) -> Result<bool, Error> {
        Ok(self.inner.ll_remove(key.as_bytes())?)
    }

    fn clear(&mut self) -> Result<(), Error> {
        Ok(self.inner.ll_clear()?)
    }

    /// Encodes the whole batch before touching the engine, so an encode
    /// failure leaves the store untouched.
    fn apply(&mut self, batch: WriteBatch) -> Result<(), Error> {
        let mut ll_batch = LLBatch::new();
        for op in batch {
            match op {
                BatchOp::Put { key, value } => {
                    let bytes = self.codec.encode(&value, &self.format)?;
                    ll_batch.put(key.into_string().into_bytes(), bytes);
                }
                BatchOp::Remove { key } => ll_batch.remove(key.into_string().into_bytes()),
            }
        }
        Ok(self.inner.ll_apply(ll_batch)?)
    }
}
