//! Low-level kvdoc store traits.
//!
//! This is the narrow waist of the kvdoc stack. Everything at this level is
//! pure bytes: keys are opaque byte strings, values are opaque byte payloads,
//! and no codec is involved.
//!
//! An engine only has to provide:
//! - ordered key enumeration (`ll_keys`)
//! - point reads (`ll_get`)
//! - puts, removes and a full clear
//! - atomic application of a batch of writes (`ll_apply`)
//!
//! # Example
//!
//! ```rust
//! use std::collections::BTreeMap;
//! use kvdoc_ll_store::{Bytes, LLError, LLReader};
//!
//! struct Snapshot {
//!     data: BTreeMap<Bytes, Bytes>,
//! }
//!
//! impl LLReader for Snapshot {
//!     fn ll_keys(&mut self) -> Result<Vec<Bytes>, LLError> {
//!         Ok(self.data.keys().cloned().collect())
//!     }
//!
//!     fn ll_get(&mut self, key: &[u8]) -> Result<Option<Bytes>, LLError> {
//!         Ok(self.data.get(key).cloned())
//!     }
//! }
//! ```

pub use bytes::Bytes;

mod batch;
mod error;
mod traits;

pub use batch::{LLBatch, LLOp};
pub use error::LLError;
pub use traits::{LLReader, LLStore, LLWriter};
