/// Result type for port operations.
pub type RepoResult<T> = Result<T, RepoError>;

/// Errors a persistence port can report.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    /// The backend failed.
    #[error("storage error: {0}")]
    Storage(String),

    /// `add` was called with an id that is already stored.
    #[error("duplicate row: {0}")]
    Duplicate(String),

    /// `save` or `remove` was called for a row that is not stored.
    #[error("row not stored: {0}")]
    Missing(String),
}
