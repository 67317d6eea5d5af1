use crate::geometry::{LayoutSnapshot, Viewport};
use crate::observer::{IntersectionObserver, ObserverOptions};
use costscope_core::VisibilityChange;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Wait before attaching observers, so rows rendered before layout settles
/// are present.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(200);

/// One notification batch, processed to completion before the next.
pub type VisibilityBatch = Vec<VisibilityChange>;

#[derive(Debug, Clone, PartialEq)]
pub struct TrackerConfig {
    pub observer: ObserverOptions,
    pub settle_delay: Duration,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            observer: ObserverOptions::default(),
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }
}

/// Summary of a tracker run, returned on teardown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackerExit {
    /// Whether the deferred attach happened before teardown.
    pub attached: bool,
    /// Observers released on teardown.
    pub released: usize,
    pub batches_sent: usize,
}

/// Event-driven visibility tracker.
///
/// The host publishes mounted rows through a [`LayoutSnapshot`] channel and
/// scroll position through a [`Viewport`] channel; the tracker emits
/// [`VisibilityBatch`]es. Observers attach once, after the settle delay, to
/// whatever rows are mounted at that moment. Rows mounted later are never
/// observed; observed rows that unmount are retracted.
pub struct VisibilityTracker {
    config: TrackerConfig,
    observer: IntersectionObserver,
    batches_sent: usize,
}

/// Owner side of a running tracker. Dropping it tears the tracker down too.
pub struct TrackerHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<TrackerExit>,
}

impl TrackerHandle {
    /// Signal teardown and wait for the tracker to release its observers.
    pub async fn shutdown(self) -> TrackerExit {
        let _ = self.shutdown.send(true);
        match self.task.await {
            Ok(exit) => exit,
            Err(e) => {
                warn!("Visibility tracker task failed: {e}");
                TrackerExit::default()
            }
        }
    }
}

impl VisibilityTracker {
    pub fn new(config: TrackerConfig) -> Self {
        let observer = IntersectionObserver::new(config.observer.clone());
        Self {
            config,
            observer,
            batches_sent: 0,
        }
    }

    /// Spawn the tracker on the current runtime.
    pub fn spawn(
        self,
        layout: watch::Receiver<LayoutSnapshot>,
        viewport: watch::Receiver<Viewport>,
        events: mpsc::UnboundedSender<VisibilityBatch>,
    ) -> TrackerHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(self.run(layout, viewport, events, shutdown_rx));
        TrackerHandle {
            shutdown: shutdown_tx,
            task,
        }
    }

    async fn run(
        mut self,
        mut layout: watch::Receiver<LayoutSnapshot>,
        mut viewport: watch::Receiver<Viewport>,
        events: mpsc::UnboundedSender<VisibilityBatch>,
        mut shutdown: watch::Receiver<bool>,
    ) -> TrackerExit {
        tokio::select! {
            _ = tokio::time::sleep(self.config.settle_delay) => {}
            _ = shutdown_requested(&mut shutdown) => {
                debug!("Tracker torn down before attach; nothing observed");
                return TrackerExit::default();
            }
        }

        self.attach(&layout.borrow_and_update());
        if !self.publish(&events, &viewport.borrow_and_update()) {
            return self.teardown();
        }

        let mut layout_open = true;
        loop {
            tokio::select! {
                changed = viewport.changed() => {
                    if changed.is_err() {
                        debug!("Viewport source closed");
                        break;
                    }
                }
                changed = layout.changed(), if layout_open => {
                    if changed.is_err() {
                        debug!("Layout source closed; keeping last known bounds");
                        layout_open = false;
                        continue;
                    }
                    let retracted = self.sync_layout(&layout.borrow_and_update());
                    if !retracted.is_empty() && !self.send(&events, retracted) {
                        break;
                    }
                }
                _ = shutdown_requested(&mut shutdown) => break,
            }

            if !self.publish(&events, &viewport.borrow_and_update()) {
                break;
            }
        }

        self.teardown()
    }

    fn attach(&mut self, layout: &LayoutSnapshot) {
        for (id, bounds) in layout.iter() {
            self.observer.observe(id, bounds);
        }
        if self.observer.is_empty() {
            debug!("No rows mounted at attach time");
        } else {
            info!(observed = self.observer.len(), "Attached visibility observers");
        }
    }

    /// Refresh bounds of observed rows and retract rows that unmounted.
    /// Rows that appeared after attach are ignored.
    fn sync_layout(&mut self, layout: &LayoutSnapshot) -> VisibilityBatch {
        let observed: Vec<String> = self.observer.observed_ids().map(str::to_string).collect();
        let mut retracted = Vec::new();
        for id in observed {
            match layout.get(&id) {
                Some(bounds) => {
                    self.observer.update_bounds(&id, bounds);
                }
                None => {
                    debug!("Observed row unmounted: {id}");
                    retracted.extend(self.observer.unobserve(&id));
                }
            }
        }
        retracted
    }

    fn publish(
        &mut self,
        events: &mpsc::UnboundedSender<VisibilityBatch>,
        viewport: &Viewport,
    ) -> bool {
        let batch = self.observer.evaluate(viewport);
        batch.is_empty() || self.send(events, batch)
    }

    fn send(
        &mut self,
        events: &mpsc::UnboundedSender<VisibilityBatch>,
        batch: VisibilityBatch,
    ) -> bool {
        debug!(changes = batch.len(), "Visibility batch");
        if events.send(batch).is_err() {
            debug!("Visibility consumer dropped");
            return false;
        }
        self.batches_sent += 1;
        true
    }

    fn teardown(mut self) -> TrackerExit {
        let released = self.observer.disconnect();
        debug!(released, "Visibility tracker stopped");
        TrackerExit {
            attached: true,
            released,
            batches_sent: self.batches_sent,
        }
    }
}

/// Resolves once shutdown is signaled or the handle is dropped.
async fn shutdown_requested(rx: &mut watch::Receiver<bool>) {
    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            return;
        }
    }
}
