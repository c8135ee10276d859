//! Scan-based queries over a store.
//!
//! Every query takes one snapshot of the store's keys, then visits them in
//! enumeration order exactly once, loading and matching each value. Only
//! arrays and maps are candidates; scalar documents are skipped. A key that
//! vanished since the snapshot, or whose payload fails to load or decode, is
//! skipped as well: a scan never fails because of a single key.
//!
//! There is no transaction around a scan. If other writers change the store
//! while it runs, the result can mix states. Offset pagination is relative to
//! the current key order, so re-running it over a changed store can skip or
//! repeat entries; [`find_page`] resumes from a key instead.

use crate::{matches, Codec, Error, Key, Reader, Value};

/// Default page size for [`find_many`].
pub const DEFAULT_LIMIT: usize = 10;

/// Options for [`find_many`].
#[derive(Clone, Debug, PartialEq)]
pub struct QueryOptions {
    /// The pattern documents must match.
    pub pattern: Value,
    /// Maximum number of entries returned.
    pub limit: usize,
    /// Number of leading matches to skip.
    pub offset: usize,
}

impl QueryOptions {
    pub fn new(pattern: Value) -> Self {
        Self {
            pattern,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    #[must_use]
    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            pattern: Value::map(),
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

/// A stored document together with its key.
#[derive(Clone, Debug, PartialEq)]
pub struct Entry {
    pub key: Key,
    pub value: Value,
}

/// Result of [`find_one`]: both fields are `None` when nothing matched.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MatchResult {
    pub key: Option<Key>,
    pub value: Option<Value>,
}

impl MatchResult {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_none(&self) -> bool {
        self.key.is_none()
    }

    pub fn into_entry(self) -> Option<Entry> {
        match (self.key, self.value) {
            (Some(key), Some(value)) => Some(Entry { key, value }),
            _ => None,
        }
    }
}

impl From<Option<Entry>> for MatchResult {
    fn from(entry: Option<Entry>) -> Self {
        match entry {
            Some(Entry { key, value }) => MatchResult {
                key: Some(key),
                value: Some(value),
            },
            None => MatchResult::none(),
        }
    }
}

/// One page of a cursor scan.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Page {
    pub entries: Vec<Entry>,
    /// Cursor for the next page; `None` once the key space is exhausted.
    pub next: Option<Key>,
}

/// Return the first document matching `pattern`.
pub fn find_one<S: Reader + ?Sized>(
    store: &mut S,
    codec: &dyn Codec,
    pattern: &Value,
) -> Result<MatchResult, Error> {
    let keys = store.keys()?;
    let found = Matches::new(store, codec, pattern, keys).next();
    Ok(found.into())
}

/// Return up to `limit` matching documents after skipping `offset` matches.
pub fn find_many<S: Reader + ?Sized>(
    store: &mut S,
    codec: &dyn Codec,
    options: &QueryOptions,
) -> Result<Vec<Entry>, Error> {
    if options.limit == 0 {
        return Ok(Vec::new());
    }

    let keys = store.keys()?;
    Ok(Matches::new(store, codec, &options.pattern, keys)
        .skip(options.offset)
        .take(options.limit)
        .collect())
}

/// Return up to `limit` matching documents whose keys sort after `after`.
///
/// Feed `Page::next` back in as `after` to continue. Keys inserted behind the
/// cursor are not revisited and keys already returned are never repeated.
pub fn find_page<S: Reader + ?Sized>(
    store: &mut S,
    codec: &dyn Codec,
    pattern: &Value,
    after: Option<&Key>,
    limit: usize,
) -> Result<Page, Error> {
    if limit == 0 {
        return Err(Error::invalid_argument("page limit must be at least 1"));
    }

    let mut keys = store.keys()?;
    if let Some(after) = after {
        keys.retain(|k| k > after);
    }

    let entries: Vec<Entry> = Matches::new(store, codec, pattern, keys)
        .take(limit)
        .collect();
    let next = if entries.len() == limit {
        entries.last().map(|e| e.key.clone())
    } else {
        None
    };

    Ok(Page { entries, next })
}

/// Lazily yields matching entries from a key snapshot.
struct Matches<'a, S: ?Sized> {
    store: &'a mut S,
    codec: &'a dyn Codec,
    pattern: &'a Value,
    keys: std::vec::IntoIter<Key>,
}

impl<'a, S: Reader + ?Sized> Matches<'a, S> {
    fn new(store: &'a mut S, codec: &'a dyn Codec, pattern: &'a Value, keys: Vec<Key>) -> Self {
        Self {
            store,
            codec,
            pattern,
            keys: keys.into_iter(),
        }
    }

    fn load(&mut self, key: &Key) -> Option<Value> {
        let record = match self.store.read(key) {
            Ok(Some(record)) => record,
            Ok(None) => return None,
            Err(e) => {
                tracing::debug!(%key, error = %e, "skipping key that failed to load");
                return None;
            }
        };

        match record.into_value(self.codec) {
            Ok(value) if value.is_object_shaped() => Some(value),
            Ok(_) => None,
            Err(e) => {
                tracing::debug!(%key, error = %e, "skipping key that failed to decode");
                None
            }
        }
    }
}

impl<S: Reader + ?Sized> Iterator for Matches<'_, S> {
    type Item = Entry;

    fn next(&mut self) -> Option<Entry> {
        while let Some(key) = self.keys.next() {
            let Some(value) = self.load(&key) else {
                continue;
            };
            if matches(self.pattern, &value) {
                return Some(Entry { key, value });
            }
        }
        None
    }
}
