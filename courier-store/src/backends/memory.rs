use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use courier_common::Submission;

use crate::{MessageStore, StoreError};

/// In-memory backing store implementation
///
/// Submissions live in a `Vec` behind an `RwLock`; the whole append happens
/// under the write lock, so concurrent appends are never lost. Nothing
/// survives the process, which makes it suitable for development and tests.
///
/// # Capacity Management
/// With a capacity set, appends past the limit fail with
/// [`StoreError::CapacityExceeded`] instead of growing without bound.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackingStore {
    pub(crate) submissions: Arc<RwLock<Vec<Submission>>>,
    /// Maximum number of submissions to store (None = unlimited)
    capacity: Option<usize>,
}

impl MemoryBackingStore {
    /// Create a new empty memory-backed store with unlimited capacity
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new memory-backed store with a capacity limit
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            submissions: Arc::default(),
            capacity: Some(capacity),
        }
    }

    /// Get the current number of stored submissions
    ///
    /// Recovers gracefully if the lock is poisoned by accessing the underlying data.
    #[must_use]
    pub fn len(&self) -> usize {
        self.submissions
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the configured capacity (None = unlimited)
    #[must_use]
    pub const fn capacity(&self) -> Option<usize> {
        self.capacity
    }
}

#[async_trait]
impl MessageStore for MemoryBackingStore {
    async fn append(&self, submission: &Submission) -> crate::Result<()> {
        let mut submissions = self.submissions.write()?;

        if let Some(capacity) = self.capacity
            && submissions.len() >= capacity
        {
            return Err(StoreError::CapacityExceeded { capacity });
        }

        submissions.push(submission.clone());
        Ok(())
    }

    async fn list(&self) -> crate::Result<Vec<Submission>> {
        Ok(self.submissions.read()?.clone())
    }
}
