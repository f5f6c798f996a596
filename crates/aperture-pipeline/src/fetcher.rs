//! Raw asset-fetch transport

use crate::error::FetchError;
use async_trait::async_trait;

/// Transport used to pull an asset's bytes, injected at construction time.
///
/// Success means the bytes reached the environment's HTTP cache; the
/// pipeline never inspects the payload itself. Implementations make exactly
/// one best-effort attempt per call.
#[async_trait]
pub trait AssetFetcher: Send + Sync {
    /// Fetch one asset by URL.
    async fn fetch(&self, url: &str) -> Result<(), FetchError>;
}
