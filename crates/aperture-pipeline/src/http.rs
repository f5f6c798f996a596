//! HTTP-backed transports
//!
//! The shipped implementations of the catalog source and the asset fetcher.
//! Both are plain `reqwest` clients; which transport a component uses is
//! decided once, at construction, by whoever wires the pipeline together.

use crate::error::FetchError;
use crate::fetcher::AssetFetcher;
use aperture_catalog::{CatalogSource, PhotoEntry, SourceError};
use async_trait::async_trait;

/// Asset fetcher that issues plain GETs.
///
/// The response body is drained so the bytes actually land in the
/// transport-layer cache; the payload itself is discarded.
#[derive(Debug, Clone, Default)]
pub struct HttpAssetFetcher {
    client: reqwest::Client,
}

impl HttpAssetFetcher {
    /// Create a fetcher with a fresh client.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fetcher sharing an existing client's connection pool.
    #[inline]
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AssetFetcher for HttpAssetFetcher {
    async fn fetch(&self, url: &str) -> Result<(), FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| FetchError::Request(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        response
            .bytes()
            .await
            .map_err(|err| FetchError::Request(err.to_string()))?;
        Ok(())
    }
}

/// Catalog source backed by a static JSON manifest endpoint.
///
/// The manifest is a flat array of photo rows; one GET returns the whole
/// catalog.
#[derive(Debug, Clone)]
pub struct JsonManifestSource {
    client: reqwest::Client,
    manifest_url: String,
}

impl JsonManifestSource {
    /// Create a source reading from the given manifest URL.
    #[must_use]
    pub fn new(manifest_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            manifest_url: manifest_url.into(),
        }
    }
}

#[async_trait]
impl CatalogSource for JsonManifestSource {
    async fn get_photos(&self) -> Result<Vec<PhotoEntry>, SourceError> {
        let response = self
            .client
            .get(&self.manifest_url)
            .send()
            .await
            .map_err(|err| SourceError::Unreachable(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status(status.as_u16()));
        }

        response
            .json()
            .await
            .map_err(|err| SourceError::Malformed(err.to_string()))
    }
}
