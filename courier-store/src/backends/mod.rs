//! Backend implementations of [`MessageStore`](crate::MessageStore)
//!
//! - `file`: a single JSON document on disk, for production use
//! - `memory`: process memory, optionally bounded
//! - `test`: memory store with notifications and failure injection

pub mod file;
pub mod memory;

pub use file::{FileBackingStore, FileBackingStoreBuilder};
pub use memory::MemoryBackingStore;
pub use test::TestBackingStore;
