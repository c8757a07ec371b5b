pub mod backends;
pub mod config;
pub mod error;
pub mod r#trait;

pub use backends::{FileBackingStore, FileBackingStoreBuilder, MemoryBackingStore, TestBackingStore};
pub use config::{MemoryConfig, StoreConfig};
pub use error::{Result, StoreError};
pub use r#trait::MessageStore;
