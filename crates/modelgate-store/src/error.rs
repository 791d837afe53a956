//! Store error taxonomy.

/// Errors surfaced by the remote store adapters.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The remote store is unreachable or the request never completed
    #[error("remote store unreachable: {0}")]
    Connection(String),

    /// The store answered but the operation failed
    #[error("storage operation failed: {0}")]
    Storage(String),

    /// The requested object does not exist
    #[error("object not found: {0}")]
    NotFound(String),

    /// A fetched document could not be converted to a record
    #[error("malformed document: {0}")]
    Document(String),
}

impl StoreError {
    /// Whether a bounded retry may succeed.
    ///
    /// Connection and storage failures are transient; a missing object or a
    /// malformed document will not change on retry.
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Storage(_))
    }
}
