//! Tunables for preloading and viewport-gated loading

use std::time::Duration;

/// Preload attempts issued concurrently as one unit of sequencing.
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Pause inserted between settled batches.
pub const DEFAULT_BATCH_DELAY: Duration = Duration::from_millis(100);

/// Pixels of margin before the visible viewport at which loading starts.
pub const DEFAULT_ACTIVATION_MARGIN_PX: u32 = 100;

/// Minimum visible fraction of a slot before an intersection counts.
pub const DEFAULT_VISIBILITY_THRESHOLD: f32 = 0.1;

/// Bulk preload tuning.
///
/// Batch size and inter-batch delay throttle how hard the preloader leans on
/// the network stack; the right values are environment-dependent, so both
/// are configuration rather than constants.
#[derive(Debug, Clone)]
pub struct PreloadConfig {
    /// Maximum concurrent attempts per batch.
    pub batch_size: usize,
    /// Delay between consecutive batches.
    pub batch_delay: Duration,
}

impl PreloadConfig {
    /// Create default configuration.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With a custom batch size.
    #[inline]
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// With a custom inter-batch delay.
    #[inline]
    #[must_use]
    pub fn with_batch_delay(mut self, batch_delay: Duration) -> Self {
        self.batch_delay = batch_delay;
        self
    }
}

impl Default for PreloadConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            batch_delay: DEFAULT_BATCH_DELAY,
        }
    }
}

/// Viewport observation tuning.
#[derive(Debug, Clone, Copy)]
pub struct ViewportConfig {
    /// Assets begin loading this many pixels before entering the viewport.
    pub activation_margin_px: u32,
    /// Visible-area fraction below which an intersection is ignored.
    pub visibility_threshold: f32,
}

impl ViewportConfig {
    /// Create default configuration.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With a custom activation margin.
    #[inline]
    #[must_use]
    pub fn with_activation_margin_px(mut self, margin: u32) -> Self {
        self.activation_margin_px = margin;
        self
    }

    /// With a custom visibility threshold.
    #[inline]
    #[must_use]
    pub fn with_visibility_threshold(mut self, threshold: f32) -> Self {
        self.visibility_threshold = threshold;
        self
    }
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            activation_margin_px: DEFAULT_ACTIVATION_MARGIN_PX,
            visibility_threshold: DEFAULT_VISIBILITY_THRESHOLD,
        }
    }
}
