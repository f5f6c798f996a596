//! Error types for the pipeline crate

use crate::viewport::AssetPhase;
use aperture_catalog::CatalogError;

/// Failure of a single raw asset fetch.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FetchError {
    /// The request could not be issued or completed.
    #[error("asset request failed: {0}")]
    Request(String),

    /// The asset host answered with a non-success status.
    #[error("asset responded with status {0}")]
    Status(u16),
}

/// Pipeline-level failures.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The catalog could not be fetched.
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Contract violation: a phase change the asset lifecycle does not allow.
    #[error("illegal asset phase transition: {from:?} -> {to:?}")]
    IllegalTransition {
        /// Phase the asset was in.
        from: AssetPhase,
        /// Phase that was requested.
        to: AssetPhase,
    },
}
