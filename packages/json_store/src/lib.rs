//! Storage engines for kvdoc.
//!
//! - [`InMemoryStore`]: a Core store of decoded documents, for tests and
//!   throwaway databases.
//! - [`LocalDiskStore`]: an LL byte store with one file per key. Wrap it in
//!   `LLToCore` with a `JsonCodec` to get a document store.

mod in_memory;
mod local_disk;

pub use in_memory::InMemoryStore;
pub use local_disk::{LocalDiskStore, LocalStoreError, SEGMENT_LEN};
