//! Write batches applied with all-or-nothing visibility.

use bytes::Bytes;

/// A single staged write.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LLOp {
    /// Store `data` under `key`, replacing any previous payload.
    Put { key: Bytes, data: Bytes },
    /// Delete `key` if present.
    Remove { key: Bytes },
}

impl LLOp {
    /// The key this operation touches.
    pub fn key(&self) -> &Bytes {
        match self {
            LLOp::Put { key, .. } | LLOp::Remove { key } => key,
        }
    }
}

/// An ordered list of writes.
///
/// Later operations on the same key win. Engines apply a batch either
/// completely or not at all.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LLBatch {
    ops: Vec<LLOp>,
}

impl LLBatch {
    /// Create an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage a put.
    pub fn put(&mut self, key: impl Into<Bytes>, data: impl Into<Bytes>) {
        self.ops.push(LLOp::Put {
            key: key.into(),
            data: data.into(),
        });
    }

    /// Stage a remove.
    pub fn remove(&mut self, key: impl Into<Bytes>) {
        self.ops.push(LLOp::Remove { key: key.into() });
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LLOp> {
        self.ops.iter()
    }
}

impl IntoIterator for LLBatch {
    type Item = LLOp;
    type IntoIter = std::vec::IntoIter<LLOp>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.into_iter()
    }
}

impl FromIterator<LLOp> for LLBatch {
    fn from_iter<I: IntoIterator<Item = LLOp>>(iter: I) -> Self {
        Self {
            ops: iter.into_iter().collect(),
        }
    }
}
