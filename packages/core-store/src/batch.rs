//! Value-level write batches.

use crate::{Key, Value};

/// A single staged write.
#[derive(Clone, Debug, PartialEq)]
pub enum BatchOp {
    Put { key: Key, value: Value },
    Remove { key: Key },
}

impl BatchOp {
    pub fn key(&self) -> &Key {
        match self {
            BatchOp::Put { key, .. } | BatchOp::Remove { key } => key,
        }
    }
}

/// An ordered list of writes applied with all-or-nothing visibility.
///
/// Later operations on the same key win.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WriteBatch {
    ops: Vec<BatchOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, key: Key, value: Value) {
        self.ops.push(BatchOp::Put { key, value });
    }

    pub fn remove(&mut self, key: Key) {
        self.ops.push(BatchOp::Remove { key });
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BatchOp> {
        self.ops.iter()
    }

    /// The most recent staged state of `key` in this batch.
    ///
    /// * `None` - the batch never touches `key`.
    /// * `Some(None)` - the last operation removes it.
    /// * `Some(Some(value))` - the last operation puts `value`.
    pub fn lookup(&self, key: &Key) -> Option<Option<&Value>> {
        self.ops.iter().rev().find(|op| op.key() == key).map(|op| match op {
            BatchOp::Put { value, .. } => Some(value),
            BatchOp::Remove { .. } => None,
        })
    }
}

impl IntoIterator for WriteBatch {
    type Item = BatchOp;
    type IntoIter = std::vec::IntoIter<BatchOp>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.into_iter()
    }
}
