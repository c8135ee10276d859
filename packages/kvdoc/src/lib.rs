//! kvdoc: an embedded key-value document database.
//!
//! Documents are [`Value`] trees stored under string [`Key`]s. On top of
//! plain get/set, the [`Database`] answers structural queries: a pattern
//! document describes which fields must hold which values, and the
//! database scans its keys in order returning documents that fit.
//!
//! # Example
//!
//! ```rust,no_run
//! use kvdoc::{Database, DatabaseConfig, QueryOptions};
//! use kvdoc_serde_store::parse_json;
//!
//! let db = Database::open(DatabaseConfig::from_env("data"))?;
//! db.set("posts:1", parse_json(r#"{"tags": ["rust", "db"], "draft": false}"#)?)?;
//!
//! let pattern = parse_json(r#"{"tags": ["rust"], "draft": false}"#)?;
//! for entry in db.find_many(&QueryOptions::new(pattern).limit(20))? {
//!     println!("{}", entry.key);
//! }
//! # Ok::<(), kvdoc::Error>(())
//! ```
//!
//! # Async Support
//!
//! Enable the `async` feature for [`AsyncDatabase`], which runs each call on
//! tokio's blocking pool.

mod config;
mod database;
mod range;
mod transaction;

#[cfg(feature = "async")]
mod async_db;

pub use config::{DatabaseConfig, INSTANCE_ID_ENV};
pub use database::{Database, INSTANCE_KEY};
pub use range::RangeOptions;
pub use transaction::Transaction;

#[cfg(feature = "async")]
pub use async_db::AsyncDatabase;

pub use kvdoc_core_store::{
    key, matches, Entry, Error, Key, KeyError, MatchResult, Page, QueryOptions, Value,
    DEFAULT_LIMIT,
};
