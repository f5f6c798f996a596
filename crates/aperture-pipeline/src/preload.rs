//! Bulk asset preloading with observable progress
//!
//! A run pulls the catalog once, deduplicates asset URLs, and warms them in
//! fixed-size concurrent batches. Batches settle strictly in sequence; a
//! broken asset is logged and counted, never fatal. The gallery's blocking
//! loading screen is driven entirely by the published progress snapshots.

use crate::config::PreloadConfig;
use crate::fetcher::AssetFetcher;
use aperture_catalog::{CatalogCache, CatalogSource};
use futures::future::join_all;
use indexmap::IndexSet;
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::watch;

/// Snapshot published whenever the run's state changes.
///
/// The loading screen is driven by these two fields and nothing else.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PreloadProgress {
    /// Whole-number progress, 0 through 100.
    pub percent: u8,
    /// Whether a bulk run is currently live.
    pub preloading: bool,
}

#[derive(Debug, Default)]
struct PreloadState {
    preloading: bool,
    percent: u8,
    loaded: HashSet<String>,
    failed: Vec<String>,
}

/// Coordinates one bulk preload run over the catalog's distinct asset URLs.
///
/// Construct a single coordinator per process and pass it down explicitly;
/// it owns its state and nothing else mutates it. Progress is exposed
/// through read-only accessors and a watch channel.
pub struct PreloadCoordinator<S> {
    cache: Arc<CatalogCache<S>>,
    fetcher: Arc<dyn AssetFetcher>,
    config: PreloadConfig,
    state: RwLock<PreloadState>,
    progress_tx: watch::Sender<PreloadProgress>,
    progress_rx: watch::Receiver<PreloadProgress>,
}

impl<S: CatalogSource> PreloadCoordinator<S> {
    /// Create a coordinator with default configuration.
    #[must_use]
    pub fn new(cache: Arc<CatalogCache<S>>, fetcher: Arc<dyn AssetFetcher>) -> Self {
        Self::with_config(cache, fetcher, PreloadConfig::default())
    }

    /// Create a coordinator with explicit configuration.
    #[must_use]
    pub fn with_config(
        cache: Arc<CatalogCache<S>>,
        fetcher: Arc<dyn AssetFetcher>,
        config: PreloadConfig,
    ) -> Self {
        let (progress_tx, progress_rx) = watch::channel(PreloadProgress::default());
        Self {
            cache,
            fetcher,
            config,
            state: RwLock::new(PreloadState::default()),
            progress_tx,
            progress_rx,
        }
    }

    /// Run the bulk preload to completion.
    ///
    /// Idempotent per run: a call while a run is live returns immediately.
    /// A missing catalog and an empty catalog both complete the run at 100%
    /// so the gallery stays usable with nothing behind it. Failures of
    /// individual assets are absorbed; the run has no failure state.
    pub async fn start(&self) {
        {
            let mut state = self.state.write();
            if state.preloading {
                tracing::debug!("preload run already live, ignoring start");
                return;
            }
            state.preloading = true;
            state.percent = 0;
            state.failed.clear();
        }
        self.publish();

        let photos = match self.cache.photos().await {
            Ok(photos) => photos,
            Err(err) => {
                tracing::error!("catalog unavailable, nothing to preload: {}", err);
                self.finish();
                return;
            }
        };

        if photos.is_empty() {
            tracing::info!("no photos to preload");
            self.finish();
            return;
        }

        let urls: Vec<String> = photos
            .iter()
            .map(|photo| photo.image_url.clone())
            .collect::<IndexSet<_>>()
            .into_iter()
            .collect();
        let total = urls.len();
        tracing::info!(
            "preloading {} distinct assets across {} photos",
            total,
            photos.len()
        );

        let mut completed = 0usize;
        for (index, batch) in urls.chunks(self.config.batch_size.max(1)).enumerate() {
            if index > 0 {
                tokio::time::sleep(self.config.batch_delay).await;
            }

            let outcomes = join_all(batch.iter().map(|url| self.attempt(url))).await;
            completed += batch.len();

            {
                let mut state = self.state.write();
                for (url, ok) in batch.iter().zip(outcomes) {
                    if ok {
                        state.loaded.insert(url.clone());
                    } else {
                        state.failed.push(url.clone());
                    }
                }
                state.percent = percent(completed, total);
            }
            self.publish();
            tracing::debug!(
                "preload progress: {}% ({}/{})",
                percent(completed, total),
                completed,
                total
            );
        }

        self.finish();
        tracing::info!(
            "preload complete: {} loaded, {} failed",
            self.loaded_count(),
            self.failed_count()
        );
    }

    /// Warm a single asset outside the bulk run.
    ///
    /// Never fails; a broken asset is logged and skipped. Bulk progress is
    /// untouched, only the loaded set is updated.
    pub async fn preload_one(&self, url: &str) {
        if self.attempt(url).await {
            self.state.write().loaded.insert(url.to_string());
        }
    }

    /// Whether a bulk run is currently live.
    #[inline]
    #[must_use]
    pub fn is_preloading(&self) -> bool {
        self.state.read().preloading
    }

    /// Progress of the current or most recent bulk run, 0 through 100.
    #[inline]
    #[must_use]
    pub fn progress_percent(&self) -> u8 {
        self.state.read().percent
    }

    /// Whether an asset URL has been confirmed warm.
    #[inline]
    #[must_use]
    pub fn is_loaded(&self, url: &str) -> bool {
        self.state.read().loaded.contains(url)
    }

    /// Number of assets confirmed warm.
    #[inline]
    #[must_use]
    pub fn loaded_count(&self) -> usize {
        self.state.read().loaded.len()
    }

    /// Number of assets that failed during the current or most recent run.
    #[inline]
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.state.read().failed.len()
    }

    /// URLs that failed during the current or most recent run.
    #[must_use]
    pub fn failed_urls(&self) -> Vec<String> {
        self.state.read().failed.clone()
    }

    /// Subscribe to progress snapshots.
    ///
    /// The loading screen awaits changes here instead of polling.
    #[inline]
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<PreloadProgress> {
        self.progress_rx.clone()
    }

    async fn attempt(&self, url: &str) -> bool {
        match self.fetcher.fetch(url).await {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!("failed to preload asset {}: {}", url, err);
                false
            }
        }
    }

    fn finish(&self) {
        {
            let mut state = self.state.write();
            state.percent = 100;
            state.preloading = false;
        }
        self.publish();
    }

    fn publish(&self) {
        let snapshot = {
            let state = self.state.read();
            PreloadProgress {
                percent: state.percent,
                preloading: state.preloading,
            }
        };
        self.progress_tx.send_replace(snapshot);
    }
}

/// Whole-number progress percentage, rounded half away from zero.
///
/// A zero-asset run is vacuously complete.
fn percent(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    ((completed as f64 / total as f64) * 100.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn percent_of_zero_total_is_complete() {
        assert_eq!(percent(0, 0), 100);
    }

    #[test]
    fn percent_rounds_half_up() {
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(2, 3), 67);
        assert_eq!(percent(1, 8), 13);
        assert_eq!(percent(10, 10), 100);
        assert_eq!(percent(0, 10), 0);
    }

    proptest! {
        #[test]
        fn prop_percent_is_monotonic_and_bounded(total in 1usize..500, completed in 0usize..500) {
            let completed = completed.min(total);
            let now = percent(completed, total);
            prop_assert!(now <= 100);
            if completed < total {
                prop_assert!(now <= percent(completed + 1, total));
            } else {
                prop_assert_eq!(now, 100);
            }
        }
    }
}
