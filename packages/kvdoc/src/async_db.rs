//! Async facade over [`Database`].
//!
//! Each call runs the blocking operation on tokio's blocking pool.

use std::sync::Arc;

use kvdoc_core_store::{Entry, Error, Key, MatchResult, Page, QueryOptions, Value};

use crate::{Database, RangeOptions, Transaction};

/// A cloneable async handle to a [`Database`].
#[derive(Debug, Clone)]
pub struct AsyncDatabase {
    inner: Arc<Database>,
}

impl AsyncDatabase {
    pub fn new(db: Database) -> Self {
        Self {
            inner: Arc::new(db),
        }
    }

    /// The underlying synchronous database.
    pub fn blocking(&self) -> &Database {
        &self.inner
    }

    async fn run<T, F>(&self, f: F) -> Result<T, Error>
    where
        T: Send + 'static,
        F: FnOnce(&Database) -> Result<T, Error> + Send + 'static,
    {
        let db = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || f(&db))
            .await
            .map_err(|e| Error::Other {
                message: format!("blocking task failed: {e}"),
            })?
    }

    pub async fn set(&self, key: impl Into<String>, value: impl Into<Value>) -> Result<Value, Error> {
        let (key, value) = (key.into(), value.into());
        self.run(move |db| db.set(key, value)).await
    }

    pub async fn get(&self, key: impl Into<String>) -> Result<Option<Value>, Error> {
        let key = key.into();
        self.run(move |db| db.get(key)).await
    }

    pub async fn get_entry(&self, key: impl Into<String>) -> Result<Option<Entry>, Error> {
        let key = key.into();
        self.run(move |db| db.get_entry(key)).await
    }

    pub async fn get_many(&self, keys: Vec<String>) -> Result<Vec<Option<Value>>, Error> {
        self.run(move |db| db.get_many(&keys)).await
    }

    pub async fn remove(&self, key: impl Into<String>) -> Result<bool, Error> {
        let key = key.into();
        self.run(move |db| db.remove(key)).await
    }

    pub async fn does_exist(
        &self,
        key: impl Into<String>,
        expected: Option<Value>,
    ) -> Result<bool, Error> {
        let key = key.into();
        self.run(move |db| db.does_exist(key, expected.as_ref()))
            .await
    }

    pub async fn increase_value(
        &self,
        key: impl Into<String>,
        by: impl Into<Value>,
    ) -> Result<Value, Error> {
        let (key, by) = (key.into(), by.into());
        self.run(move |db| db.increase_value(key, by)).await
    }

    pub async fn decrease_value(
        &self,
        key: impl Into<String>,
        by: impl Into<Value>,
    ) -> Result<Value, Error> {
        let (key, by) = (key.into(), by.into());
        self.run(move |db| db.decrease_value(key, by)).await
    }

    pub async fn transaction<T, F>(&self, f: F) -> Result<T, Error>
    where
        T: Send + 'static,
        F: FnOnce(&mut Transaction<'_>) -> Result<T, Error> + Send + 'static,
    {
        self.run(move |db| db.transaction(f)).await
    }

    pub async fn get_range(&self, range: RangeOptions) -> Result<Vec<Entry>, Error> {
        self.run(move |db| db.get_range(&range)).await
    }

    pub async fn get_keys(&self, range: RangeOptions) -> Result<Vec<Key>, Error> {
        self.run(move |db| db.get_keys(&range)).await
    }

    pub async fn list(&self, prefix: impl Into<String>) -> Result<Vec<Key>, Error> {
        let prefix = prefix.into();
        self.run(move |db| db.list(&prefix)).await
    }

    pub async fn clear(&self) -> Result<(), Error> {
        self.run(|db| db.clear()).await
    }

    pub async fn find_one(&self, pattern: Value) -> Result<MatchResult, Error> {
        self.run(move |db| db.find_one(&pattern)).await
    }

    pub async fn find_many(&self, options: QueryOptions) -> Result<Vec<Entry>, Error> {
        self.run(move |db| db.find_many(&options)).await
    }

    pub async fn find_page(
        &self,
        pattern: Value,
        after: Option<Key>,
        limit: usize,
    ) -> Result<Page, Error> {
        self.run(move |db| db.find_page(&pattern, after.as_ref(), limit))
            .await
    }
}

impl From<Database> for AsyncDatabase {
    fn from(db: Database) -> Self {
        Self::new(db)
    }
}
