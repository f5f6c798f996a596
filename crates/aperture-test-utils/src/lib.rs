//! Testing utilities for the aperture workspace
//!
//! Shared fakes for the injected collaborators: catalog sources, asset
//! fetchers, and visibility observers.

#![allow(missing_docs)]

use aperture_catalog::{CatalogSource, PhotoEntry, SourceError};
use aperture_pipeline::{
    AssetFetcher, FetchError, ObservationHandle, ViewportConfig, VisibilityEvent,
    VisibilityObserver,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{mpsc, watch};

/// A minimal photo entry.
pub fn photo(id: &str, url: &str) -> PhotoEntry {
    PhotoEntry::new(id, url)
}

/// A photo entry with category metadata.
pub fn photo_in_category(id: &str, url: &str, name: &str, slug: &str) -> PhotoEntry {
    PhotoEntry::new(id, url).with_category(name, slug)
}

/// Catalog fixture: 20 photos over 12 distinct URLs, with 8 URLs each
/// shared by two photos.
pub fn catalog_with_shared_urls() -> Vec<PhotoEntry> {
    let mut photos = Vec::new();
    for i in 0..12 {
        photos.push(photo(
            &format!("p{i}"),
            &format!("https://cdn.test/photo-{i}.jpg"),
        ));
    }
    for i in 0..8 {
        photos.push(photo(
            &format!("dup{i}"),
            &format!("https://cdn.test/photo-{i}.jpg"),
        ));
    }
    photos
}

/// Catalog fixture: `count` photos with distinct URLs.
pub fn catalog_of(count: usize) -> Vec<PhotoEntry> {
    (0..count)
        .map(|i| {
            photo(
                &format!("p{i}"),
                &format!("https://cdn.test/photo-{i}.jpg"),
            )
        })
        .collect()
}

/// In-memory catalog source with call counting and scriptable failure.
#[derive(Default)]
pub struct StaticSource {
    photos: Mutex<Vec<PhotoEntry>>,
    calls: AtomicUsize,
    fail: AtomicBool,
}

impl StaticSource {
    pub fn new(photos: Vec<PhotoEntry>) -> Self {
        Self {
            photos: Mutex::new(photos),
            calls: AtomicUsize::new(0),
            fail: AtomicBool::new(false),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Number of retrievals performed so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Make every subsequent retrieval fail (or succeed again).
    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Replace the backing photo list.
    pub fn set_photos(&self, photos: Vec<PhotoEntry>) {
        *self.photos.lock() = photos;
    }
}

#[async_trait]
impl CatalogSource for StaticSource {
    async fn get_photos(&self) -> Result<Vec<PhotoEntry>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(SourceError::Unreachable(
                "static source told to fail".to_string(),
            ));
        }
        Ok(self.photos.lock().clone())
    }
}

/// Asset fetcher that records every requested URL, with scriptable failures,
/// an optional artificial latency, and a gate for holding fetches in flight.
pub struct ScriptedFetcher {
    calls: Mutex<Vec<String>>,
    failing: Mutex<HashSet<String>>,
    latency: Mutex<Option<Duration>>,
    hold: watch::Sender<bool>,
}

impl Default for ScriptedFetcher {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failing: Mutex::new(HashSet::new()),
            latency: Mutex::new(None),
            hold: watch::Sender::new(false),
        }
    }
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with every fetch blocked until [`ScriptedFetcher::release`].
    pub fn held(self) -> Self {
        self.hold.send_replace(true);
        self
    }

    /// Let held fetches proceed.
    pub fn release(&self) {
        self.hold.send_replace(false);
    }

    /// Make fetches of the given URLs fail.
    pub fn fail_for<I, U>(self, urls: I) -> Self
    where
        I: IntoIterator<Item = U>,
        U: Into<String>,
    {
        {
            let mut failing = self.failing.lock();
            failing.extend(urls.into_iter().map(Into::into));
        }
        self
    }

    /// Make every fetch take this long.
    pub fn with_latency(self, latency: Duration) -> Self {
        *self.latency.lock() = Some(latency);
        self
    }

    /// Every URL requested so far, in request order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    /// Total number of fetches issued.
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Number of distinct URLs requested.
    pub fn distinct_calls(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .collect::<HashSet<_>>()
            .len()
    }
}

#[async_trait]
impl AssetFetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str) -> Result<(), FetchError> {
        self.calls.lock().push(url.to_string());

        let mut gate = self.hold.subscribe();
        while *gate.borrow_and_update() {
            if gate.changed().await.is_err() {
                break;
            }
        }

        let latency = *self.latency.lock();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        if self.failing.lock().contains(url) {
            return Err(FetchError::Request(format!("scripted failure for {url}")));
        }
        Ok(())
    }
}

/// Visibility observer driven by hand from tests.
#[derive(Default)]
pub struct ManualObserver {
    senders: Mutex<Vec<mpsc::Sender<VisibilityEvent>>>,
}

impl ManualObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live observations.
    pub fn observer_count(&self) -> usize {
        let mut senders = self.senders.lock();
        senders.retain(|sender| !sender.is_closed());
        senders.len()
    }

    /// Deliver an intersection event to every live observation.
    pub fn emit(&self, intersecting: bool) {
        let mut senders = self.senders.lock();
        senders.retain(|sender| !sender.is_closed());
        for sender in senders.iter() {
            let _ = sender.try_send(VisibilityEvent { intersecting });
        }
    }
}

impl VisibilityObserver for ManualObserver {
    fn observe(&self, _config: &ViewportConfig) -> ObservationHandle {
        let (tx, rx) = mpsc::channel(16);
        self.senders.lock().push(tx);
        ObservationHandle::new(rx)
    }
}

/// Poll until `condition` holds, giving the runtime time to make progress.
///
/// Returns whether the condition held before the two-second deadline.
pub async fn wait_until(condition: impl Fn() -> bool) -> bool {
    for _ in 0..2000 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    condition()
}
