//! Core traits for the LL layer.

use bytes::Bytes;

use crate::{LLBatch, LLError, LLOp};

/// Read bytes by key.
///
/// This is the lowest-level read interface. Keys are opaque byte strings and
/// the returned data is just bytes. No parsing, no validation.
///
/// # Object Safety
///
/// This trait is object-safe: you can use `Box<dyn LLReader>`.
pub trait LLReader: Send + Sync {
    /// Enumerate every key currently stored.
    ///
    /// The returned list is a snapshot taken at call time and must be in a
    /// stable, deterministic order (bytewise ascending for the engines in
    /// this workspace).
    fn ll_keys(&mut self) -> Result<Vec<Bytes>, LLError>;

    /// Read the payload stored under `key`.
    ///
    /// # Returns
    ///
    /// * `Ok(None)` - The key does not exist (not an error condition).
    /// * `Ok(Some(bytes))` - The stored payload.
    /// * `Err(LLError)` - An engine failure occurred.
    fn ll_get(&mut self, key: &[u8]) -> Result<Option<Bytes>, LLError>;
}

/// Write bytes by key.
///
/// # Object Safety
///
/// This trait is object-safe: you can use `Box<dyn LLWriter>`.
pub trait LLWriter: Send + Sync {
    /// Store `data` under `key`, replacing any previous payload.
    fn ll_put(&mut self, key: &[u8], data: Bytes) -> Result<(), LLError>;

    /// Delete `key`. Returns whether it existed.
    fn ll_remove(&mut self, key: &[u8]) -> Result<bool, LLError>;

    /// Delete every key.
    fn ll_clear(&mut self) -> Result<(), LLError>;

    /// Apply a batch of writes.
    ///
    /// The default implementation applies operations one at a time and is
    /// only all-or-nothing if no individual operation can fail. Engines that
    /// can fail part way through must override it.
    fn ll_apply(&mut self, batch: LLBatch) -> Result<(), LLError> {
        for op in batch {
            match op {
                LLOp::Put { key, data } => self.ll_put(&key, data)?,
                LLOp::Remove { key } => {
                    self.ll_remove(&key)?;
                }
            }
        }
        Ok(())
    }
}

/// Combined read/write at the LL level.
///
/// Automatically implemented for any type that implements both `LLReader`
/// and `LLWriter`.
pub trait LLStore: LLReader + LLWriter {}
impl<T: LLReader + LLWriter> LLStore for T {}

// Blanket implementations for references and boxes

impl<T: LLReader + ?Sized> LLReader for &mut T {
    fn ll_keys(&mut self) -> Result<Vec<Bytes>, LLError> {
        (*self).ll_keys()
    }

    fn ll_get(&mut self, key: &[u8]) -> Result<Option<Bytes>, LLError> {
        (*self).ll_get(key)
    }
}

impl<T: LLWriter + ?Sized> LLWriter for &mut T {
    fn ll_put(&mut self, key: &[u8], data: Bytes) -> Result<(), LLError> {
        (*self).ll_put(key, data)
    }

    fn ll_remove(&mut self, key: &[u8]) -> Result<bool, LLError> {
        (*self).ll_remove(key)
    }

    fn ll_clear(&mut self) -> Result<(), LLError> {
        (*self).ll_clear()
    }

    fn ll_apply(&mut self, batch: LLBatch) -> Result<(), LLError> {
        (*self).ll_apply(batch)
    }
}

impl<T: LLReader + ?Sized> LLReader for Box<T> {
    fn ll_keys(&mut self) -> Result<Vec<Bytes>, LLError> {
        self.as_mut().ll_keys()
    }

    fn ll_get(&mut self, key: &[u8]) -> Result<Option<Bytes>, LLError> {
        self.as_mut().ll_get(key)
    }
}

impl<T: LLWriter + ?Sized> LLWriter for Box<T> {
    fn ll_put(&mut self, key: &[u8], data: Bytes) -> Result<(), LLError> {
        self.as_mut().ll_put(key, data)
    }

    fn ll_remove(&mut self, key: &[u8]) -> Result<bool, LLError> {
        self.as_mut().ll_remove(key)
    }

    fn ll_clear(&mut self) -> Result<(), LLError> {
        self.as_mut().ll_clear()
    }

    fn ll_apply(&mut self, batch: LLBatch) -> Result<(), LLError> {
        self.as_mut().ll_apply(batch)
    }
}
