use crate::tracker::VisibilityBatch;
use costscope_core::totals::furthest_visible_index;
use costscope_core::{CostItem, Totals, TotalsEngine, VisibilityChange, VisibilitySet};
use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::debug;

/// Totals as last published, with enough context to render the sticky bar.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TotalsSnapshot {
    /// Incremented on every publish; 0 is the initial snapshot.
    pub revision: u64,
    pub totals: Totals,
    /// Id of the furthest visible row bounding the scroll totals.
    pub furthest_visible: Option<String>,
    pub visible_count: usize,
}

/// Single writer of the visible set; republishes totals after each batch.
pub struct TotalsPublisher {
    engine: TotalsEngine,
    items: Vec<CostItem>,
    visible: VisibilitySet,
    revision: u64,
}

impl TotalsPublisher {
    pub fn new(engine: TotalsEngine, items: Vec<CostItem>) -> Self {
        Self {
            engine,
            items,
            visible: VisibilitySet::new(),
            revision: 0,
        }
    }

    pub fn visible(&self) -> &VisibilitySet {
        &self.visible
    }

    /// Recompute from scratch against the current visible set.
    pub fn snapshot(&self) -> TotalsSnapshot {
        TotalsSnapshot {
            revision: self.revision,
            totals: self.engine.compute(&self.items, &self.visible),
            furthest_visible: furthest_visible_index(&self.items, &self.visible)
                .map(|idx| self.items[idx].id.clone()),
            visible_count: self.visible.len(),
        }
    }

    /// Apply one batch and return the new snapshot.
    pub fn apply(&mut self, batch: &[VisibilityChange]) -> TotalsSnapshot {
        self.visible.apply_all(batch);
        self.revision += 1;
        self.snapshot()
    }

    /// Consume batches until the tracker closes its sender. Returns the
    /// receiver for the latest snapshot and the task yielding the final
    /// visible set.
    pub fn spawn(
        mut self,
        mut batches: mpsc::UnboundedReceiver<VisibilityBatch>,
    ) -> (watch::Receiver<TotalsSnapshot>, JoinHandle<VisibilitySet>) {
        let (tx, rx) = watch::channel(self.snapshot());
        let task = tokio::spawn(async move {
            while let Some(batch) = batches.recv().await {
                let snapshot = self.apply(&batch);
                debug!(
                    revision = snapshot.revision,
                    visible = snapshot.visible_count,
                    "Republishing totals"
                );
                tx.send_replace(snapshot);
            }
            self.visible
        });
        (rx, task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use costscope_core::testing::reference_items;

    #[test]
    fn initial_snapshot_uses_prefix_fallback() {
        let publisher = TotalsPublisher::new(TotalsEngine::default(), reference_items());
        let snapshot = publisher.snapshot();
        assert_eq!(snapshot.revision, 0);
        assert_eq!(snapshot.totals.small, 70_000.0);
        assert_eq!(snapshot.furthest_visible, None);
    }

    #[test]
    fn apply_updates_visible_set_and_revision() {
        let mut publisher = TotalsPublisher::new(TotalsEngine::default(), reference_items());
        let snapshot = publisher.apply(&[
            VisibilityChange::new("a", true, 1.0),
            VisibilityChange::new("b", true, 0.5),
        ]);
        assert_eq!(snapshot.revision, 1);
        assert_eq!(snapshot.furthest_visible.as_deref(), Some("b"));
        assert_eq!(snapshot.visible_count, 2);
        assert_eq!(snapshot.totals.small, 70_000.0);

        let snapshot = publisher.apply(&[VisibilityChange::new("b", false, 0.0)]);
        assert_eq!(snapshot.revision, 2);
        assert_eq!(snapshot.totals.small, 60_000.0);
        assert!(publisher.visible().contains("a"));
    }

    #[tokio::test]
    async fn spawned_publisher_republishes_each_batch() {
        let publisher = TotalsPublisher::new(TotalsEngine::default(), reference_items());
        let (tx, rx) = mpsc::unbounded_channel();
        let (mut totals_rx, task) = publisher.spawn(rx);
        assert_eq!(totals_rx.borrow_and_update().revision, 0);

        tx.send(vec![VisibilityChange::new("a", true, 1.0)])
            .expect("send batch");
        totals_rx.changed().await.expect("totals update");
        let snapshot = totals_rx.borrow_and_update().clone();
        assert_eq!(snapshot.revision, 1);
        assert_eq!(snapshot.totals.small, 60_000.0);
        assert_eq!(snapshot.totals.medium_composite, 495.0);
        assert_eq!(snapshot.totals.medium_alternative, 4_062.0);

        drop(tx);
        let visible = task.await.expect("publisher task");
        assert!(visible.contains("a"));
    }
}
