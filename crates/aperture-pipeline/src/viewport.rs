//! Viewport-gated loading for one rendered image slot
//!
//! Each rendered image owns one loader. Mounting registers a visibility
//! observation; the first time the slot becomes visible the observation is
//! dropped and the real fetch begins. Until then only placeholder content
//! is shown and no network request for the full asset is issued.

use crate::config::ViewportConfig;
use crate::error::PipelineError;
use crate::fetcher::AssetFetcher;
use crate::observer::{ObservationHandle, VisibilityObserver};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Lifecycle of one mounted asset slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AssetPhase {
    /// Mounted, not yet scrolled near the viewport.
    NotVisible,
    /// Visible; the real fetch is in flight.
    Loading,
    /// Fetch confirmed complete.
    Loaded,
    /// Fetch failed; the slot shows a fixed failure indicator.
    Errored,
}

/// Phases reachable from `from` in one step.
///
/// `Loaded` and `Errored` are terminal for a mount; a failed asset is never
/// retried automatically.
#[must_use]
pub fn allowed_transitions(from: AssetPhase) -> Vec<AssetPhase> {
    use AssetPhase::*;
    match from {
        NotVisible => vec![Loading],
        Loading => vec![Loaded, Errored],
        Loaded => vec![],
        Errored => vec![],
    }
}

/// Validates a phase transition.
pub fn validate_transition(from: AssetPhase, to: AssetPhase) -> Result<(), PipelineError> {
    if allowed_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(PipelineError::IllegalTransition { from, to })
    }
}

/// What the slot should render right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetDisplay {
    /// Low-resolution stand-in shown at reduced opacity.
    PlaceholderImage {
        /// URL of the placeholder variant.
        src: String,
    },
    /// Indeterminate spinner when no placeholder was supplied.
    Spinner,
    /// The real asset, cross-faded in.
    Image {
        /// URL of the full asset.
        src: String,
    },
    /// Fixed failure indicator; never blank, never retried.
    LoadFailed,
}

type SlotCallback = Box<dyn FnOnce() + Send>;

#[derive(Default)]
struct Callbacks {
    on_load: Option<SlotCallback>,
    on_error: Option<SlotCallback>,
}

struct Shared {
    phase: RwLock<AssetPhase>,
    mounted: AtomicBool,
    // Bumped on every mount and unmount; a task created for an older
    // generation may observe but never write.
    generation: AtomicU64,
    callbacks: Mutex<Callbacks>,
}

impl Shared {
    /// Apply `-> to` only while the originating mount is still live.
    fn try_transition(&self, generation: u64, to: AssetPhase) -> bool {
        if !self.mounted.load(Ordering::SeqCst)
            || self.generation.load(Ordering::SeqCst) != generation
        {
            return false;
        }
        let mut phase = self.phase.write();
        if validate_transition(*phase, to).is_err() {
            return false;
        }
        *phase = to;
        true
    }

    fn fire_on_load(&self) {
        if let Some(callback) = self.callbacks.lock().on_load.take() {
            callback();
        }
    }

    fn fire_on_error(&self) {
        if let Some(callback) = self.callbacks.lock().on_error.take() {
            callback();
        }
    }
}

/// Lazily-loading image slot bound to one rendered element.
///
/// State is owned by this instance alone; two loaders for the same URL know
/// nothing about each other and rely on the transport's response cache to
/// share bytes.
pub struct ViewportLoader {
    src: String,
    placeholder_src: Option<String>,
    config: ViewportConfig,
    fetcher: Arc<dyn AssetFetcher>,
    observer: Arc<dyn VisibilityObserver>,
    shared: Arc<Shared>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl ViewportLoader {
    /// Create a loader for one asset URL.
    #[must_use]
    pub fn new(
        src: impl Into<String>,
        fetcher: Arc<dyn AssetFetcher>,
        observer: Arc<dyn VisibilityObserver>,
    ) -> Self {
        Self {
            src: src.into(),
            placeholder_src: None,
            config: ViewportConfig::default(),
            fetcher,
            observer,
            shared: Arc::new(Shared {
                phase: RwLock::new(AssetPhase::NotVisible),
                mounted: AtomicBool::new(false),
                generation: AtomicU64::new(0),
                callbacks: Mutex::new(Callbacks::default()),
            }),
            task: Mutex::new(None),
        }
    }

    /// With a low-resolution placeholder variant, fetched ahead of the full
    /// asset once the slot becomes visible.
    #[must_use]
    pub fn with_placeholder(mut self, src: impl Into<String>) -> Self {
        self.placeholder_src = Some(src.into());
        self
    }

    /// With custom observation tuning.
    #[must_use]
    pub fn with_config(mut self, config: ViewportConfig) -> Self {
        self.config = config;
        self
    }

    /// React once when the asset finishes loading.
    #[must_use]
    pub fn on_load(self, callback: impl FnOnce() + Send + 'static) -> Self {
        self.shared.callbacks.lock().on_load = Some(Box::new(callback));
        self
    }

    /// React once when the asset fails to load.
    #[must_use]
    pub fn on_error(self, callback: impl FnOnce() + Send + 'static) -> Self {
        self.shared.callbacks.lock().on_error = Some(Box::new(callback));
        self
    }

    /// Begin observing for visibility.
    ///
    /// Returns `false` and registers nothing when the loader is already
    /// mounted, so a re-rendered slot cannot end up with two observers.
    pub fn mount(&self) -> bool {
        if self.shared.mounted.swap(true, Ordering::SeqCst) {
            tracing::debug!("viewport loader for {} already mounted", self.src);
            return false;
        }
        let generation = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;
        *self.shared.phase.write() = AssetPhase::NotVisible;

        let observation = self.observer.observe(&self.config);
        let task = tokio::spawn(drive(
            Arc::clone(&self.shared),
            observation,
            Arc::clone(&self.fetcher),
            self.src.clone(),
            self.placeholder_src.clone(),
            generation,
        ));
        *self.task.lock() = Some(task);
        true
    }

    /// Tear down the slot.
    ///
    /// Deregisters the observation in any state and abandons an in-flight
    /// fetch; nothing observable changes afterwards even if that fetch
    /// eventually resolves.
    pub fn unmount(&self) {
        if !self.shared.mounted.swap(false, Ordering::SeqCst) {
            return;
        }
        self.shared.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(task) = self.task.lock().take() {
            task.abort();
        }
    }

    /// Current lifecycle phase.
    #[inline]
    #[must_use]
    pub fn phase(&self) -> AssetPhase {
        *self.shared.phase.read()
    }

    /// Content the slot should render in its current phase.
    #[must_use]
    pub fn display(&self) -> AssetDisplay {
        match self.phase() {
            AssetPhase::Loaded => AssetDisplay::Image {
                src: self.src.clone(),
            },
            AssetPhase::Errored => AssetDisplay::LoadFailed,
            AssetPhase::NotVisible | AssetPhase::Loading => match &self.placeholder_src {
                Some(src) => AssetDisplay::PlaceholderImage { src: src.clone() },
                None => AssetDisplay::Spinner,
            },
        }
    }

    /// URL bound to the rendered element; `None` until loading begins.
    #[must_use]
    pub fn bound_src(&self) -> Option<&str> {
        matches!(self.phase(), AssetPhase::Loading | AssetPhase::Loaded)
            .then_some(self.src.as_str())
    }

    /// The asset URL this slot was created for.
    #[inline]
    #[must_use]
    pub fn src(&self) -> &str {
        &self.src
    }
}

impl Drop for ViewportLoader {
    fn drop(&mut self) {
        self.unmount();
    }
}

async fn drive(
    shared: Arc<Shared>,
    mut observation: ObservationHandle,
    fetcher: Arc<dyn AssetFetcher>,
    src: String,
    placeholder: Option<String>,
    generation: u64,
) {
    loop {
        match observation.next_event().await {
            Some(event) if event.intersecting => break,
            Some(_) => continue,
            None => return,
        }
    }
    // At-most-once activation: the observation is dropped before any fetch,
    // so later enter/leave events cannot re-trigger one.
    drop(observation);

    if !shared.try_transition(generation, AssetPhase::Loading) {
        return;
    }

    if let Some(placeholder) = placeholder {
        if let Err(err) = fetcher.fetch(&placeholder).await {
            tracing::debug!("placeholder fetch failed for {}: {}", placeholder, err);
        }
    }

    match fetcher.fetch(&src).await {
        Ok(()) => {
            if shared.try_transition(generation, AssetPhase::Loaded) {
                shared.fire_on_load();
            }
        }
        Err(err) => {
            tracing::warn!("asset failed to load in viewport: {}: {}", src, err);
            if shared.try_transition(generation, AssetPhase::Errored) {
                shared.fire_on_error();
            }
        }
    }
}
