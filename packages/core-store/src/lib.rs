//! kvdoc core: the semantic store layer.
//!
//! This layer adds meaning to the raw bytes of the LL layer:
//! - `Key`: validated, non-empty UTF-8 key
//! - `Value`: decoded document tree
//! - `Record`: either raw bytes or a decoded Value
//! - `Codec`/`Format`: how bytes become Values and back
//!
//! On top of the store traits it provides the document query facility:
//! - [`matches`]: structural matching of a pattern against a document
//! - [`find_one`], [`find_many`], [`find_page`]: scans over a store's key space
//!
//! # Example
//!
//! ```rust
//! use kvdoc_core_store::{find_one, key, Key, NoCodec, Reader, Record, Value, Writer};
//! # use std::collections::BTreeMap;
//! # use kvdoc_core_store::Error;
//! # #[derive(Default)]
//! # struct Mem(BTreeMap<Key, Record>);
//! # impl Reader for Mem {
//! #     fn keys(&mut self) -> Result<Vec<Key>, Error> { Ok(self.0.keys().cloned().collect()) }
//! #     fn read(&mut self, key: &Key) -> Result<Option<Record>, Error> { Ok(self.0.get(key).cloned()) }
//! # }
//! # impl Writer for Mem {
//! #     fn write(&mut self, key: &Key, data: Record) -> Result<(), Error> { self.0.insert(key.clone(), data); Ok(()) }
//! #     fn remove(&mut self, key: &Key) -> Result<bool, Error> { Ok(self.0.remove(key).is_some()) }
//! #     fn clear(&mut self) -> Result<(), Error> { self.0.clear(); Ok(()) }
//! # }
//! let mut store = Mem::default();
//! let doc: Value = [("name", "Alice")].into_iter().collect();
//! store.write(&key!("users:1"), Record::parsed(doc.clone())).unwrap();
//!
//! let pattern: Value = [("name", Value::from(vec!["Alice", "Bob"]))].into_iter().collect();
//! let found = find_one(&mut store, &NoCodec, &pattern).unwrap();
//! assert_eq!(found.value, Some(doc));
//! ```

pub use bytes::Bytes;

mod batch;
mod bridge;
mod error;
mod format;
mod key;
mod matcher;
mod query;
mod record;
mod traits;
mod value;

pub use batch::{BatchOp, WriteBatch};
pub use bridge::LLToCore;
pub use error::Error;
pub use format::Format;
pub use key::{Key, KeyError, MAX_KEY_LEN};
pub use matcher::matches;
pub use query::{
    find_many, find_one, find_page, Entry, MatchResult, Page, QueryOptions, DEFAULT_LIMIT,
};
pub use record::Record;
pub use traits::{Codec, NoCodec, Reader, Store, Writer};
pub use value::{Kind, Value};

// Re-export LL types for convenience
pub use kvdoc_ll_store::{LLBatch, LLError, LLOp, LLReader, LLStore, LLWriter};
