use async_trait::async_trait;
use courier_common::Submission;

/// Durable, append-only record of submissions.
///
/// Implementations must never lose an append when several callers write
/// concurrently, and `list` returns records in the order they were appended.
#[async_trait]
pub trait MessageStore: Send + Sync + std::fmt::Debug {
    /// Add a submission to the end of the record.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be read or written.
    async fn append(&self, submission: &Submission) -> crate::Result<()>;

    /// Every stored submission, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be read.
    async fn list(&self) -> crate::Result<Vec<Submission>>;
}
