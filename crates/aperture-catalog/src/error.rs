//! Error types for the catalog crate

/// Failure reported by a catalog source.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SourceError {
    /// The backing store could not be reached.
    #[error("source unreachable: {0}")]
    Unreachable(String),

    /// The source answered with a non-success status.
    #[error("source responded with status {0}")]
    Status(u16),

    /// The payload could not be decoded into catalog records.
    #[error("malformed catalog payload: {0}")]
    Malformed(String),
}

/// Error surfaced by the catalog cache.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CatalogError {
    /// The underlying retrieval failed; no entry was written.
    #[error("catalog retrieval failed: {0}")]
    Retrieval(#[from] SourceError),
}
