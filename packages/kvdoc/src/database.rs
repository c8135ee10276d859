//! The `Database` facade.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use kvdoc_core_store::{
    find_many, find_one, find_page, Codec, Entry, Error, Format, Key, LLError, LLToCore,
    MatchResult, Page, QueryOptions, Record, Store, Value,
};
use kvdoc_json_store::{InMemoryStore, LocalDiskStore};
use kvdoc_serde_store::{to_value, MultiCodec, TypedReader};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::DatabaseConfig;
use crate::range::RangeOptions;
use crate::transaction::Transaction;

/// Key under which the owning environment's instance id is kept.
pub const INSTANCE_KEY: &str = "REPL_ID";

/// An embedded document database.
///
/// Every operation takes the store lock for its whole duration, so
/// operations are atomic with respect to each other. Queries scan under the
/// lock too and observe a consistent store.
///
/// # Example
///
/// ```rust
/// use kvdoc::{Database, QueryOptions};
/// use kvdoc_serde_store::parse_json;
///
/// let db = Database::in_memory();
/// db.set("users:1", parse_json(r#"{"name": "Alice", "role": "admin"}"#)?)?;
/// db.set("users:2", parse_json(r#"{"name": "Bob", "role": "dev"}"#)?)?;
///
/// let found = db.find_one(&parse_json(r#"{"role": ["admin", "owner"]}"#)?)?;
/// assert_eq!(found.key.map(|k| k.into_string()), Some("users:1".to_string()));
/// # Ok::<(), kvdoc::Error>(())
/// ```
pub struct Database {
    store: Mutex<Box<dyn Store>>,
    codec: Arc<dyn Codec>,
    format: Format,
    path: Option<PathBuf>,
}

impl Database {
    /// Open the directory-backed database described by `config`.
    ///
    /// If the data was last opened under a different instance id it is
    /// wiped first.
    pub fn open(config: DatabaseConfig) -> Result<Self, Error> {
        if config.path.as_os_str().is_empty() {
            return Err(Error::invalid_argument("no database path given"));
        }

        let engine = if config.create_if_missing {
            LocalDiskStore::open_or_create(&config.path)
        } else {
            LocalDiskStore::open(&config.path)
        }
        .map_err(LLError::from)?;
        let path = engine.root().to_path_buf();

        let codec: Arc<MultiCodec> = Arc::new(MultiCodec::with_json());
        let store = LLToCore::new(engine, codec.clone(), Format::JSON);

        let db = Self {
            store: Mutex::new(Box::new(store)),
            codec,
            format: Format::JSON,
            path: Some(path),
        };
        db.reconcile_instance(config.instance_id_ref())?;

        info!(path = %config.path.display(), "database ready");
        Ok(db)
    }

    /// A fresh database that lives in memory only.
    pub fn in_memory() -> Self {
        Self::with_store(InMemoryStore::new(), MultiCodec::with_json())
    }

    /// Wrap any store. `codec` decodes raw records the store hands out.
    pub fn with_store(store: impl Store + 'static, codec: impl Codec + 'static) -> Self {
        Self {
            store: Mutex::new(Box::new(store)),
            codec: Arc::new(codec),
            format: Format::JSON,
            path: None,
        }
    }

    /// Data directory, for disk-backed databases.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn reconcile_instance(&self, configured: Option<&str>) -> Result<(), Error> {
        let key = Key::parse(INSTANCE_KEY)?;
        let mut store = self.store.lock();

        let stored = match store.read(&key)? {
            Some(record) => Some(record.into_value(&*self.codec)?),
            None => None,
        };

        match stored {
            Some(Value::String(id)) if Some(id.as_str()) == configured => return Ok(()),
            Some(previous) => {
                info!(
                    previous = previous.as_str().unwrap_or("<not a string>"),
                    current = configured.unwrap_or("<none>"),
                    "instance id changed, clearing database"
                );
                store.clear()?;
            }
            None => {}
        }

        if let Some(id) = configured {
            store.write(&key, Record::parsed(Value::from(id)))?;
        }
        Ok(())
    }

    fn read_value(&self, store: &mut dyn Store, key: &Key) -> Result<Option<Value>, Error> {
        match store.read(key)? {
            Some(record) => Ok(Some(record.into_value(&*self.codec)?)),
            None => Ok(None),
        }
    }

    /// Store `value` under `key` and hand it back.
    ///
    /// `Null` is rejected: an absent value and a stored null would be
    /// indistinguishable to `get`.
    pub fn set(&self, key: impl AsRef<str>, value: impl Into<Value>) -> Result<Value, Error> {
        let key = Key::parse(key.as_ref())?;
        let value = value.into();
        if value.is_null() {
            return Err(Error::invalid_argument(format!("no value given for {key}")));
        }
        self.store.lock().write(&key, Record::parsed(value.clone()))?;
        Ok(value)
    }

    /// Serialize `data` and store it under `key`.
    pub fn set_as<T: Serialize>(&self, key: impl AsRef<str>, data: &T) -> Result<Value, Error> {
        self.set(key, to_value(data)?)
    }

    pub fn get(&self, key: impl AsRef<str>) -> Result<Option<Value>, Error> {
        let key = Key::parse(key.as_ref())?;
        let mut store = self.store.lock();
        self.read_value(&mut **store, &key)
    }

    /// Read the value under `key` into a Rust type.
    pub fn get_as<T: DeserializeOwned>(&self, key: impl AsRef<str>) -> Result<Option<T>, Error> {
        let key = Key::parse(key.as_ref())?;
        self.store.lock().read_as(&key, &*self.codec)
    }

    pub fn get_entry(&self, key: impl AsRef<str>) -> Result<Option<Entry>, Error> {
        let key = Key::parse(key.as_ref())?;
        let value = self.get(&key)?;
        Ok(value.map(|value| Entry { key, value }))
    }

    /// The stored bytes under `key`, without decoding.
    ///
    /// Stores that keep decoded values hand out their JSON encoding.
    pub fn get_binary(&self, key: impl AsRef<str>) -> Result<Option<Bytes>, Error> {
        let key = Key::parse(key.as_ref())?;
        match self.store.lock().read(&key)? {
            Some(record) => Ok(Some(record.into_bytes(&*self.codec, &self.format)?)),
            None => Ok(None),
        }
    }

    /// Values for several keys at once, in argument order.
    pub fn get_many<K: AsRef<str>>(&self, keys: &[K]) -> Result<Vec<Option<Value>>, Error> {
        let keys = keys
            .iter()
            .map(|k| Key::parse(k.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        let mut store = self.store.lock();
        keys.iter()
            .map(|key| self.read_value(&mut **store, key))
            .collect()
    }

    /// Delete `key`. Returns whether it existed.
    pub fn remove(&self, key: impl AsRef<str>) -> Result<bool, Error> {
        let key = Key::parse(key.as_ref())?;
        self.store.lock().remove(&key)
    }

    /// Whether `key` exists, and when `expected` is given, holds that value.
    pub fn does_exist(&self, key: impl AsRef<str>, expected: Option<&Value>) -> Result<bool, Error> {
        let current = self.get(key)?;
        Ok(match (current, expected) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(current), Some(expected)) => &current == expected,
        })
    }

    /// Add `by` to the number under `key` and return the new value.
    ///
    /// Integers stay integers when `by` is an integer; anything else is
    /// computed in floating point.
    pub fn increase_value(&self, key: impl AsRef<str>, by: impl Into<Value>) -> Result<Value, Error> {
        let by = by.into();
        self.adjust(key.as_ref(), by)
    }

    /// Subtract `by` from the number under `key` and return the new value.
    pub fn decrease_value(&self, key: impl AsRef<str>, by: impl Into<Value>) -> Result<Value, Error> {
        let negated = match by.into() {
            Value::Integer(i) => Value::Integer(
                i.checked_neg()
                    .ok_or_else(|| Error::invalid_argument("decrement overflows"))?,
            ),
            Value::Float(f) => Value::Float(-f),
            other => return Err(non_numeric_step(&other)),
        };
        self.adjust(key.as_ref(), negated)
    }

    fn adjust(&self, key: &str, by: Value) -> Result<Value, Error> {
        let key = Key::parse(key)?;
        if by.as_f64().is_none() {
            return Err(non_numeric_step(&by));
        }

        self.transaction(|txn| {
            let current = txn
                .get_key(&key)?
                .ok_or_else(|| Error::NotFound { key: key.clone() })?;

            let next = match (&current, &by) {
                (Value::Integer(a), Value::Integer(b)) => Value::Integer(
                    a.checked_add(*b).ok_or_else(|| {
                        Error::invalid_argument(format!("counter {key} overflows"))
                    })?,
                ),
                (current, by) => match (current.as_f64(), by.as_f64()) {
                    (Some(a), Some(b)) => Value::Float(a + b),
                    _ => {
                        return Err(Error::TypeMismatch {
                            key: key.clone(),
                            expected: "number",
                            found: current.type_name(),
                        })
                    }
                },
            };

            txn.set_key(key.clone(), next.clone())?;
            Ok(next)
        })
    }

    /// Run `f` in a transaction only if `key` is absent.
    ///
    /// Returns whether `f` ran (and committed).
    ///
    /// # Deadlocks
    ///
    /// `f` runs with the database locked. Calling methods on this
    /// `Database` from inside `f` (for example through a captured `&db`)
    /// never returns; read and write through the `Transaction` handle.
    pub fn if_no_exists<F>(&self, key: impl AsRef<str>, f: F) -> Result<bool, Error>
    where
        F: FnOnce(&mut Transaction<'_>) -> Result<(), Error>,
    {
        let key = Key::parse(key.as_ref())?;
        self.transaction(|txn| {
            if txn.get_key(&key)?.is_some() {
                return Ok(false);
            }
            f(txn)?;
            Ok(true)
        })
    }

    /// Run `f` against a transaction and commit its writes if it succeeds.
    ///
    /// On `Err` nothing is written and the error is returned unchanged.
    ///
    /// # Deadlocks
    ///
    /// The database stays locked from the first read until commit, so other
    /// callers never see half a transaction. The lock is not reentrant:
    /// inside `f`, use the `Transaction` handle, not this `Database`.
    pub fn transaction<T, F>(&self, f: F) -> Result<T, Error>
    where
        F: FnOnce(&mut Transaction<'_>) -> Result<T, Error>,
    {
        let mut store = self.store.lock();
        let mut txn = Transaction::new(&mut **store, &*self.codec);
        let result = f(&mut txn)?;

        let batch = txn.into_batch();
        if !batch.is_empty() {
            debug!(ops = batch.len(), "committing transaction");
            store.apply(batch)?;
        }
        Ok(result)
    }

    /// Entries in a key range.
    pub fn get_range(&self, range: &RangeOptions) -> Result<Vec<Entry>, Error> {
        let mut store = self.store.lock();
        let keys = range.select(store.keys()?);
        let mut entries = Vec::with_capacity(keys.len());
        for key in keys {
            if let Some(value) = self.read_value(&mut **store, &key)? {
                entries.push(Entry { key, value });
            }
        }
        Ok(entries)
    }

    /// Keys in a key range.
    pub fn get_keys(&self, range: &RangeOptions) -> Result<Vec<Key>, Error> {
        let keys = self.store.lock().keys()?;
        Ok(range.select(keys))
    }

    /// All keys starting with `prefix`, in key order.
    pub fn list(&self, prefix: &str) -> Result<Vec<Key>, Error> {
        let mut keys = self.store.lock().keys()?;
        keys.retain(|k| k.has_prefix(prefix));
        keys.sort();
        Ok(keys)
    }

    pub fn len(&self) -> Result<usize, Error> {
        Ok(self.store.lock().keys()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, Error> {
        Ok(self.len()? == 0)
    }

    /// Delete every key, the instance id included.
    pub fn clear(&self) -> Result<(), Error> {
        self.store.lock().clear()
    }

    /// Delete every key and, for disk-backed databases, the data directory.
    pub fn drop_database(self) -> Result<(), Error> {
        self.clear()?;
        if let Some(path) = self.path.as_deref() {
            std::fs::remove_dir_all(path).map_err(LLError::from)?;
            info!(path = %path.display(), "database dropped");
        }
        Ok(())
    }

    /// Close the database. Writes are already durable; this releases the
    /// store.
    pub fn close(self) -> Result<(), Error> {
        debug!(path = ?self.path, "closing database");
        Ok(())
    }

    /// The first document matching `pattern`, in key order.
    pub fn find_one(&self, pattern: &Value) -> Result<MatchResult, Error> {
        let mut store = self.store.lock();
        find_one(&mut **store, &*self.codec, pattern)
    }

    /// Matching documents, paged by offset.
    pub fn find_many(&self, options: &QueryOptions) -> Result<Vec<Entry>, Error> {
        let mut store = self.store.lock();
        find_many(&mut **store, &*self.codec, options)
    }

    /// Matching documents after the cursor `after`.
    pub fn find_page(
        &self,
        pattern: &Value,
        after: Option<&Key>,
        limit: usize,
    ) -> Result<Page, Error> {
        let mut store = self.store.lock();
        find_page(&mut **store, &*self.codec, pattern, after, limit)
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("path", &self.path)
            .field("format", &self.format)
            .finish_non_exhaustive()
    }
}

fn non_numeric_step(by: &Value) -> Error {
    Error::invalid_argument(format!("step must be a number, got {}", by.type_name()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use kvdoc_serde_store::parse_json;
    use serde::{Deserialize, Serialize};

    fn doc(text: &str) -> Value {
        parse_json(text).unwrap()
    }

    #[test]
    fn set_get_remove() {
        let db = Database::in_memory();

        assert_eq!(db.set("a", 1i64).unwrap(), Value::Integer(1));
        assert_eq!(db.get("a").unwrap(), Some(Value::Integer(1)));
        assert!(db.remove("a").unwrap());
        assert!(!db.remove("a").unwrap());
        assert_eq!(db.get("a").unwrap(), None);
    }

    #[test]
    fn set_rejects_null_but_not_falsy() {
        let db = Database::in_memory();

        assert!(matches!(
            db.set("k", Value::Null),
            Err(Error::InvalidArgument { .. })
        ));
        db.set("zero", 0i64).unwrap();
        db.set("empty", "").unwrap();
        db.set("no", false).unwrap();
        assert_eq!(db.len().unwrap(), 3);
    }

    #[test]
    fn empty_key_is_rejected() {
        let db = Database::in_memory();
        assert!(matches!(db.get(""), Err(Error::Key(_))));
        assert!(matches!(db.set("", 1i64), Err(Error::Key(_))));
    }

    #[test]
    fn entry_binary_and_many() {
        let db = Database::in_memory();
        db.set("a", doc(r#"{"x": 1}"#)).unwrap();
        db.set("b", "two").unwrap();

        let entry = db.get_entry("a").unwrap().unwrap();
        assert_eq!(entry.key.as_str(), "a");
        assert_eq!(db.get_entry("zz").unwrap(), None);

        assert_eq!(
            db.get_binary("a").unwrap(),
            Some(Bytes::from_static(br#"{"x":1}"#))
        );

        assert_eq!(
            db.get_many(&["b", "missing", "a"]).unwrap(),
            vec![Some(Value::from("two")), None, Some(doc(r#"{"x": 1}"#))]
        );
    }

    #[test]
    fn does_exist_with_and_without_value() {
        let db = Database::in_memory();
        db.set("k", "v").unwrap();

        assert!(db.does_exist("k", None).unwrap());
        assert!(db.does_exist("k", Some(&Value::from("v"))).unwrap());
        assert!(!db.does_exist("k", Some(&Value::from("w"))).unwrap());
        assert!(!db.does_exist("nope", None).unwrap());
    }

    #[test]
    fn counters() {
        let db = Database::in_memory();
        db.set("n", 0i64).unwrap();

        assert_eq!(db.increase_value("n", 5i64).unwrap(), Value::Integer(5));
        assert_eq!(db.decrease_value("n", 2i64).unwrap(), Value::Integer(3));
        assert_eq!(db.increase_value("n", 0.5).unwrap(), Value::Float(3.5));
        assert_eq!(db.get("n").unwrap(), Some(Value::Float(3.5)));
    }

    #[test]
    fn counter_errors() {
        let db = Database::in_memory();
        db.set("s", "text").unwrap();
        db.set("max", i64::MAX).unwrap();

        assert!(matches!(
            db.increase_value("missing", 1i64),
            Err(Error::NotFound { .. })
        ));
        assert!(matches!(
            db.increase_value("s", 1i64),
            Err(Error::TypeMismatch { .. })
        ));
        assert!(matches!(
            db.increase_value("max", 1i64),
            Err(Error::InvalidArgument { .. })
        ));
        assert!(matches!(
            db.increase_value("max", "1"),
            Err(Error::InvalidArgument { .. })
        ));
        assert_eq!(db.get("max").unwrap(), Some(Value::Integer(i64::MAX)));
    }

    #[test]
    fn transaction_reads_own_writes_and_commits() {
        let db = Database::in_memory();
        db.set("old", 1i64).unwrap();

        let seen = db
            .transaction(|txn| {
                txn.set("new", 2i64)?;
                assert!(txn.remove("old")?);
                assert!(!txn.does_exist("old")?);
                txn.get("new")
            })
            .unwrap();

        assert_eq!(seen, Some(Value::Integer(2)));
        assert_eq!(db.get("old").unwrap(), None);
        assert_eq!(db.get("new").unwrap(), Some(Value::Integer(2)));
    }

    #[test]
    fn failed_transaction_writes_nothing() {
        let db = Database::in_memory();

        let result: Result<(), Error> = db.transaction(|txn| {
            txn.set("a", 1i64)?;
            Err(Error::aborted("changed my mind"))
        });

        assert!(matches!(result, Err(Error::Aborted { .. })));
        assert!(db.is_empty().unwrap());
    }

    #[test]
    fn other_callers_wait_for_commit() {
        use std::sync::mpsc;
        use std::time::Duration;

        let db = Database::in_memory();
        let (staged_tx, staged_rx) = mpsc::channel();

        std::thread::scope(|s| {
            let shared = &db;
            let reader = s.spawn(move || {
                staged_rx.recv().unwrap();
                (shared.get("a").unwrap(), shared.get("b").unwrap())
            });

            db.transaction(|txn| {
                txn.set("a", 1i64)?;
                staged_tx.send(()).unwrap();
                std::thread::sleep(Duration::from_millis(50));
                txn.set("b", 2i64)
            })
            .unwrap();

            let (a, b) = reader.join().unwrap();
            assert_eq!(a, Some(Value::Integer(1)));
            assert_eq!(b, Some(Value::Integer(2)));
        });
    }

    #[test]
    fn if_no_exists_runs_once() {
        let db = Database::in_memory();

        let first = db
            .if_no_exists("lock", |txn| txn.set("lock", "held"))
            .unwrap();
        let second = db
            .if_no_exists("lock", |txn| txn.set("lock", "stolen"))
            .unwrap();

        assert!(first);
        assert!(!second);
        assert_eq!(db.get("lock").unwrap(), Some(Value::from("held")));
    }

    #[test]
    fn ranges_and_lists() {
        let db = Database::in_memory();
        for k in ["user:2", "user:1", "post:1", "user:3"] {
            db.set(k, k).unwrap();
        }

        let keys = |range: RangeOptions| -> Vec<String> {
            db.get_keys(&range)
                .unwrap()
                .into_iter()
                .map(Key::into_string)
                .collect()
        };

        assert_eq!(
            keys(RangeOptions::all().start(Key::parse("user:").unwrap())),
            vec!["user:1", "user:2", "user:3"]
        );
        assert_eq!(
            keys(RangeOptions::all().reverse(true).limit(2)),
            vec!["user:3", "user:2"]
        );

        let entries = db
            .get_range(&RangeOptions::all().offset(1).limit(1))
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].value, Value::from("user:1"));

        let listed: Vec<String> = db
            .list("user:")
            .unwrap()
            .into_iter()
            .map(Key::into_string)
            .collect();
        assert_eq!(listed, vec!["user:1", "user:2", "user:3"]);
        assert_eq!(db.list("").unwrap().len(), 4);
    }

    #[test]
    fn queries_skip_scalars() {
        let db = Database::in_memory();
        db.set("a", "just text").unwrap();
        db.set("b", doc(r#"{"tags": ["x", "y"]}"#)).unwrap();
        db.set("c", doc(r#"["x", "z"]"#)).unwrap();
        db.set("d", doc(r#"{"tags": []}"#)).unwrap();

        let found = db.find_one(&doc("{}")).unwrap();
        assert_eq!(found.key.map(Key::into_string), Some("b".to_string()));

        let arrays = db
            .find_many(&QueryOptions::new(doc(r#"["x"]"#)))
            .unwrap();
        assert_eq!(arrays.len(), 1);
        assert_eq!(arrays[0].key.as_str(), "c");

        let page = db.find_page(&doc("{}"), None, 1).unwrap();
        assert_eq!(page.next, Some(Key::parse("b").unwrap()));
        let rest = db.find_page(&doc("{}"), page.next.as_ref(), 1).unwrap();
        assert_eq!(rest.entries[0].key.as_str(), "d");
        assert_eq!(rest.next, Some(Key::parse("d").unwrap()));
    }

    #[test]
    fn typed_access() {
        #[derive(Debug, PartialEq, Serialize, Deserialize)]
        struct User {
            name: String,
            admin: bool,
        }

        let db = Database::in_memory();
        let alice = User {
            name: "Alice".into(),
            admin: true,
        };
        db.set_as("users:1", &alice).unwrap();

        assert_eq!(db.get_as::<User>("users:1").unwrap(), Some(alice));
        assert!(db.find_one(&doc(r#"{"admin": true}"#)).unwrap().key.is_some());
    }

    #[test]
    fn database_is_shareable_across_threads() {
        let db = Arc::new(Database::in_memory());
        db.set("n", 0i64).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let db = Arc::clone(&db);
                std::thread::spawn(move || {
                    for _ in 0..25 {
                        db.increase_value("n", 1i64).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(db.get("n").unwrap(), Some(Value::Integer(200)));
    }
}
