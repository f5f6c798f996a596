//! Aperture Catalog - photo metadata and TTL-cached retrieval
//!
//! The leaf layer of the asset delivery pipeline:
//! - Catalog records (photos and derived categories)
//! - An opaque source abstraction for wherever the records live
//! - A TTL cache keyed by request signature
//! - Delivery-URL construction for transformed variants
//!
//! # Example
//!
//! ```rust,ignore
//! use aperture_catalog::{CatalogCache, CatalogKey};
//!
//! # async fn example(source: impl aperture_catalog::CatalogSource) {
//! let cache = CatalogCache::new(source);
//!
//! let photos = cache.photos().await.unwrap_or_default();
//! let portraits = cache.fetch(&CatalogKey::Category("portrait".into())).await;
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod cache;
pub mod delivery;
pub mod entry;
pub mod error;
pub mod source;

// Re-exports for convenience
pub use cache::{CacheConfig, CatalogCache, CatalogKey, DEFAULT_TTL};
pub use delivery::DeliveryUrlBuilder;
pub use entry::{derive_categories, Category, PhotoEntry, FEATURED_CATEGORY_SLUG};
pub use error::{CatalogError, SourceError};
pub use source::CatalogSource;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the catalog
    pub use crate::{
        CacheConfig, CatalogCache, CatalogError, CatalogKey, CatalogSource, Category, PhotoEntry,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
