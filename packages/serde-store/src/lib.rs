//! Serde integration for kvdoc
//!
//! This layer provides typed access to kvdoc stores via serde. It adds:
//! - `TypedReader`: Read directly into Rust types
//! - `TypedWriter`: Write Rust types directly
//! - `JsonCodec`: The on-disk codec for documents
//! - Value <-> serde conversions
//!
//! # Example
//!
//! ```rust,ignore
//! use kvdoc_serde_store::{key, TypedReader, TypedWriter, JsonCodec};
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Serialize, Deserialize)]
//! struct User {
//!     name: String,
//!     age: u32,
//! }
//!
//! fn read_user(store: &mut dyn Store) -> Result<Option<User>, Error> {
//!     store.read_as(&key!("users:123"), &JsonCodec)
//! }
//! ```

pub use bytes::Bytes;

mod codec;
mod convert;
mod typed;

pub use codec::{JsonCodec, MultiCodec};
pub use convert::{from_value, json_to_value, parse_json, to_value, value_to_json, BINARY_TAG};
pub use typed::{TypedReader, TypedWriter};

// Re-export core types for convenience
pub use kvdoc_core_store::{
    key, Codec, Error, Format, Key, KeyError, Reader, Record, Store, Value, Writer,
};
