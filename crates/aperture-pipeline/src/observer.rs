//! Viewport-visibility primitive

use crate::config::ViewportConfig;
use tokio::sync::mpsc;

/// One intersection notification for an observed slot.
#[derive(Debug, Clone, Copy)]
pub struct VisibilityEvent {
    /// Whether the slot now meets the configured threshold.
    pub intersecting: bool,
}

/// Live observation of one rendered slot.
///
/// Dropping the handle deregisters the observation; the environment sees a
/// closed channel and stops reporting.
#[derive(Debug)]
pub struct ObservationHandle {
    events: mpsc::Receiver<VisibilityEvent>,
}

impl ObservationHandle {
    /// Wrap a channel of intersection events.
    #[inline]
    #[must_use]
    pub fn new(events: mpsc::Receiver<VisibilityEvent>) -> Self {
        Self { events }
    }

    /// Next intersection event; `None` once the observer goes away.
    pub async fn next_event(&mut self) -> Option<VisibilityEvent> {
        self.events.recv().await
    }
}

/// Environment hook reporting when rendered slots become visible.
///
/// The real implementation belongs to the hosting UI; it is injected so the
/// loading logic never has to know which environment it runs in.
pub trait VisibilityObserver: Send + Sync {
    /// Begin observing one slot with the given margin and threshold.
    fn observe(&self, config: &ViewportConfig) -> ObservationHandle;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn handle_yields_events_then_none() {
        let (tx, rx) = mpsc::channel(4);
        let mut handle = ObservationHandle::new(rx);

        tx.send(VisibilityEvent { intersecting: false }).await.unwrap();
        tx.send(VisibilityEvent { intersecting: true }).await.unwrap();
        drop(tx);

        assert!(!handle.next_event().await.unwrap().intersecting);
        assert!(handle.next_event().await.unwrap().intersecting);
        assert!(handle.next_event().await.is_none());
    }
}
