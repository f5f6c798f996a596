//! Catalog source abstraction

use crate::entry::PhotoEntry;
use crate::error::SourceError;
use async_trait::async_trait;
use std::sync::Arc;

/// Remote (or otherwise opaque) origin of catalog records.
///
/// The cache treats the source as a black box: one call returns the full
/// photo list or an error; nothing is streamed and nothing is paginated.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Retrieve every photo known to the source.
    async fn get_photos(&self) -> Result<Vec<PhotoEntry>, SourceError>;
}

#[async_trait]
impl<S: CatalogSource + ?Sized> CatalogSource for Arc<S> {
    async fn get_photos(&self) -> Result<Vec<PhotoEntry>, SourceError> {
        (**self).get_photos().await
    }
}
