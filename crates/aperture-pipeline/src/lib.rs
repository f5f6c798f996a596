//! Aperture Pipeline - asset delivery for the portfolio gallery
//!
//! The pipeline that stands between the photo catalog and the rendered
//! gallery:
//! - Bulk preloading of every distinct catalog asset in sequenced,
//!   concurrent batches with observable progress
//! - Viewport-gated loading that defers each rendered image's real fetch
//!   until it is about to scroll into view
//! - Injected transports for fetching assets and observing visibility
//!
//! # Example
//!
//! ```rust,ignore
//! use aperture_catalog::CatalogCache;
//! use aperture_pipeline::{HttpAssetFetcher, JsonManifestSource, PreloadCoordinator};
//! use std::sync::Arc;
//!
//! # async fn example() {
//! let source = JsonManifestSource::new("https://example.test/photo-storage.json");
//! let cache = Arc::new(CatalogCache::new(source));
//! let fetcher = Arc::new(HttpAssetFetcher::new());
//!
//! let coordinator = PreloadCoordinator::new(cache, fetcher);
//! coordinator.start().await;
//! assert_eq!(coordinator.progress_percent(), 100);
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod config;
pub mod error;
pub mod fetcher;
pub mod http;
pub mod observer;
pub mod preload;
pub mod viewport;

// Re-exports for convenience
pub use config::{
    PreloadConfig, ViewportConfig, DEFAULT_ACTIVATION_MARGIN_PX, DEFAULT_BATCH_DELAY,
    DEFAULT_BATCH_SIZE, DEFAULT_VISIBILITY_THRESHOLD,
};
pub use error::{FetchError, PipelineError};
pub use fetcher::AssetFetcher;
pub use http::{HttpAssetFetcher, JsonManifestSource};
pub use observer::{ObservationHandle, VisibilityEvent, VisibilityObserver};
pub use preload::{PreloadCoordinator, PreloadProgress};
pub use viewport::{
    allowed_transitions, validate_transition, AssetDisplay, AssetPhase, ViewportLoader,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the pipeline
    pub use crate::{
        AssetFetcher, AssetPhase, PreloadConfig, PreloadCoordinator, ViewportConfig,
        ViewportLoader, VisibilityObserver,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
