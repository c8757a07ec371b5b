//! Error types for the courier-store crate.

use std::io;

use thiserror::Error;

/// A failure to read or persist the submission record.
///
/// The controller records these and carries on to delivery; they never
/// reach the visitor.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading, writing or renaming the document failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The document exists but is not a JSON array of submissions.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The configured document path was refused.
    #[error("Invalid store path: {0}")]
    InvalidPath(String),

    /// A memory store reached its configured limit.
    #[error("Memory store capacity exceeded: {capacity} submissions")]
    CapacityExceeded { capacity: usize },

    /// The store is deliberately refusing writes (test backend).
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Internal error (lock poisoning, etc.).
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Specialized `Result` type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

impl<T> From<std::sync::PoisonError<T>> for StoreError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        Self::Internal(format!("Lock poisoned: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let store_err = StoreError::from(io_err);

        assert!(matches!(store_err, StoreError::Io(_)));
        assert!(store_err.to_string().contains("access denied"));
    }

    #[test]
    fn test_parse_error_conversion() {
        let parse_err = serde_json::from_str::<Vec<u8>>("{").unwrap_err();
        assert!(matches!(
            StoreError::from(parse_err),
            StoreError::Serialization(_)
        ));
    }
}
