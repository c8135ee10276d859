//! Key range selection.

use kvdoc_core_store::Key;

/// A slice of the key space, in key order.
///
/// `start` is inclusive and `end` exclusive. With `reverse` the same range is
/// walked from the top down; `offset` and `limit` apply after the direction
/// is chosen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RangeOptions {
    pub start: Option<Key>,
    pub end: Option<Key>,
    pub reverse: bool,
    pub limit: Option<usize>,
    pub offset: usize,
}

impl RangeOptions {
    /// The whole key space.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn start(mut self, key: Key) -> Self {
        self.start = Some(key);
        self
    }

    pub fn end(mut self, key: Key) -> Self {
        self.end = Some(key);
        self
    }

    pub fn reverse(mut self, reverse: bool) -> Self {
        self.reverse = reverse;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn contains(&self, key: &Key) -> bool {
        self.start.as_ref().is_none_or(|start| key >= start)
            && self.end.as_ref().is_none_or(|end| key < end)
    }

    /// Pick the selected keys out of an unordered key list.
    pub(crate) fn select(&self, mut keys: Vec<Key>) -> Vec<Key> {
        keys.retain(|k| self.contains(k));
        keys.sort();
        if self.reverse {
            keys.reverse();
        }
        keys.into_iter()
            .skip(self.offset)
            .take(self.limit.unwrap_or(usize::MAX))
            .collect()
    }
}
