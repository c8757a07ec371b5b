use std::sync::Arc;

use serde::Deserialize;

use crate::{FileBackingStore, MemoryBackingStore, MessageStore};

/// Selects the store backend from configuration.
///
/// File-backed store in RON config:
/// ```ron
/// Courier (
///     store: (
///         type: "File",
///         path: "/var/lib/courier/messages.json",
///     ),
/// )
/// ```
///
/// Memory-backed store, optionally bounded:
/// ```ron
/// Courier (
///     store: (
///         type: "Memory",
///         capacity: 1000,
///     ),
/// )
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum StoreConfig {
    /// A single JSON document on disk
    File(FileBackingStore),
    /// Process memory only; lost on exit
    Memory(MemoryConfig),
}

/// Configuration for the memory-backed store
#[derive(Debug, Clone, Deserialize, Default)]
pub struct MemoryConfig {
    /// Maximum number of submissions to keep (omit for unlimited)
    #[serde(default)]
    pub capacity: Option<usize>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::File(FileBackingStore::default())
    }
}

impl StoreConfig {
    /// The document path for file-backed stores.
    #[must_use]
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            Self::File(store) => Some(store.path()),
            Self::Memory(_) => None,
        }
    }

    /// Build the configured store, creating the document's directory when
    /// file-backed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file store cannot be initialised.
    pub async fn into_store(self) -> crate::Result<Arc<dyn MessageStore>> {
        match self {
            Self::File(store) => {
                store.init().await?;
                Ok(Arc::new(store))
            }
            Self::Memory(config) => Ok(config.capacity.map_or_else(
                || Arc::new(MemoryBackingStore::new()) as Arc<dyn MessageStore>,
                |capacity| Arc::new(MemoryBackingStore::with_capacity(capacity)),
            )),
        }
    }
}
