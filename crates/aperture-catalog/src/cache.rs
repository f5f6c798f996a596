//! TTL-memoized catalog retrieval
//!
//! One entry per request signature. A valid entry is served without I/O; a
//! fresh retrieval atomically replaces a stale or missing entry; a failed
//! retrieval discards whatever was there rather than serving stale data.

use crate::entry::{derive_categories, Category, PhotoEntry};
use crate::error::CatalogError;
use crate::source::CatalogSource;
use dashmap::DashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Default entry lifetime (5 minutes).
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Cache tuning.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum age before an entry must be refetched.
    pub ttl: Duration,
}

impl CacheConfig {
    /// Create default configuration.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With a custom entry lifetime.
    #[inline]
    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl: DEFAULT_TTL }
    }
}

/// Request signature for one cached view of the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CatalogKey {
    /// Every photo the source knows about.
    All,
    /// Photos whose category slug matches.
    Category(String),
    /// Photos flagged as featured.
    Featured,
}

impl fmt::Display for CatalogKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Category(slug) => write!(f, "category:{slug}"),
            Self::Featured => write!(f, "featured"),
        }
    }
}

#[derive(Debug)]
struct CacheEntry {
    photos: Arc<[PhotoEntry]>,
    fetched_at: Instant,
}

/// TTL cache in front of a [`CatalogSource`].
///
/// Entry writes are atomic and last-writer-wins: concurrent callers for the
/// same missing key may each retrieve, but a reader only ever observes a
/// complete entry.
#[derive(Debug)]
pub struct CatalogCache<S> {
    source: S,
    config: CacheConfig,
    entries: DashMap<CatalogKey, CacheEntry>,
}

impl<S: CatalogSource> CatalogCache<S> {
    /// Create a cache with the default TTL.
    #[inline]
    #[must_use]
    pub fn new(source: S) -> Self {
        Self::with_config(source, CacheConfig::default())
    }

    /// Create a cache with explicit configuration.
    #[inline]
    #[must_use]
    pub fn with_config(source: S, config: CacheConfig) -> Self {
        Self {
            source,
            config,
            entries: DashMap::new(),
        }
    }

    /// Fetch the catalog view for `key`.
    ///
    /// A valid entry is returned without touching the source. Otherwise the
    /// source is queried: on success the fresh view is stored before being
    /// returned; on failure any expired leftover for the key is removed and
    /// the error is surfaced to the caller.
    pub async fn fetch(&self, key: &CatalogKey) -> Result<Arc<[PhotoEntry]>, CatalogError> {
        if let Some(photos) = self.lookup(key) {
            return Ok(photos);
        }

        match self.source.get_photos().await {
            Ok(all) => {
                let view = Self::project(key, all);
                self.entries.insert(
                    key.clone(),
                    CacheEntry {
                        photos: Arc::clone(&view),
                        fetched_at: Instant::now(),
                    },
                );
                tracing::debug!("catalog entry {} refreshed ({} photos)", key, view.len());
                Ok(view)
            }
            Err(err) => {
                self.entries.remove(key);
                tracing::warn!("catalog retrieval failed for {}: {}", key, err);
                Err(err.into())
            }
        }
    }

    /// All photos (signature `all`).
    pub async fn photos(&self) -> Result<Arc<[PhotoEntry]>, CatalogError> {
        self.fetch(&CatalogKey::All).await
    }

    /// Photos in one category (signature `category:<slug>`).
    pub async fn photos_by_category(
        &self,
        slug: &str,
    ) -> Result<Arc<[PhotoEntry]>, CatalogError> {
        self.fetch(&CatalogKey::Category(slug.to_string())).await
    }

    /// Featured photos (signature `featured`).
    pub async fn featured_photos(&self) -> Result<Arc<[PhotoEntry]>, CatalogError> {
        self.fetch(&CatalogKey::Featured).await
    }

    /// Categories folded out of the full photo list.
    ///
    /// Derived from the `all` entry on every call, never cached separately.
    pub async fn categories(&self) -> Result<Vec<Category>, CatalogError> {
        Ok(derive_categories(&self.photos().await?))
    }

    /// Drop one entry; the next fetch for it hits the source again.
    #[inline]
    pub fn invalidate(&self, key: &CatalogKey) {
        self.entries.remove(key);
    }

    /// Drop every entry.
    #[inline]
    pub fn invalidate_all(&self) {
        self.entries.clear();
    }

    /// Number of stored entries, expired ones included until replaced.
    #[inline]
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    fn lookup(&self, key: &CatalogKey) -> Option<Arc<[PhotoEntry]>> {
        let entry = self.entries.get(key)?;
        (entry.fetched_at.elapsed() < self.config.ttl).then(|| Arc::clone(&entry.photos))
    }

    fn project(key: &CatalogKey, all: Vec<PhotoEntry>) -> Arc<[PhotoEntry]> {
        match key {
            CatalogKey::All => all.into(),
            CatalogKey::Category(slug) => {
                all.into_iter().filter(|p| p.in_category(slug)).collect()
            }
            CatalogKey::Featured => all.into_iter().filter(|p| p.is_featured).collect(),
        }
    }
}
