use costscope_core::testing::{reference_items, uniform_items};
use costscope_core::{TotalsEngine, VisibilitySet};
use costscope_viewport::{
    LayoutSnapshot, TotalsPublisher, TrackerConfig, TrackerExit, Viewport, VisibilityBatch,
    VisibilityTracker,
};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;

const ROW_HEIGHT: f64 = 100.0;
const LIST_TOP: f64 = 120.0;

struct Harness {
    layout_tx: watch::Sender<LayoutSnapshot>,
    viewport_tx: watch::Sender<Viewport>,
    events_rx: mpsc::UnboundedReceiver<VisibilityBatch>,
    handle: costscope_viewport::TrackerHandle,
}

fn start(layout: LayoutSnapshot, viewport: Viewport) -> Harness {
    let (layout_tx, layout_rx) = watch::channel(layout);
    let (viewport_tx, viewport_rx) = watch::channel(viewport);
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let handle =
        VisibilityTracker::new(TrackerConfig::default()).spawn(layout_rx, viewport_rx, events_tx);
    Harness {
        layout_tx,
        viewport_tx,
        events_rx,
        handle,
    }
}

fn rows(count: usize) -> LayoutSnapshot {
    let ids: Vec<String> = (0..count).map(|i| format!("r{i}")).collect();
    LayoutSnapshot::stacked(ids.iter().map(String::as_str), LIST_TOP, ROW_HEIGHT)
}

fn sorted_ids(visible: &VisibilitySet) -> Vec<&str> {
    visible.iter().collect()
}

#[tokio::test(start_paused = true)]
async fn attaches_only_after_settle_delay() {
    let started = Instant::now();
    let mut h = start(rows(3), Viewport::new(0.0, 800.0));

    let batch = h.events_rx.recv().await.expect("initial batch");
    assert!(started.elapsed() >= Duration::from_millis(200));
    assert_eq!(batch.len(), 3);
    assert!(batch.iter().all(|change| change.is_visible));

    let exit = h.handle.shutdown().await;
    assert_eq!(
        exit,
        TrackerExit {
            attached: true,
            released: 3,
            batches_sent: 1,
        }
    );
    drop((h.layout_tx, h.viewport_tx));
}

#[tokio::test(start_paused = true)]
async fn teardown_before_settle_abandons_attach() {
    let mut h = start(rows(3), Viewport::new(0.0, 800.0));
    tokio::time::sleep(Duration::from_millis(50)).await;

    let exit = h.handle.shutdown().await;
    assert_eq!(exit, TrackerExit::default());
    assert!(h.events_rx.recv().await.is_none());
    drop((h.layout_tx, h.viewport_tx));
}

#[tokio::test(start_paused = true)]
async fn rows_mounted_after_attach_are_never_observed() {
    let h = start(LayoutSnapshot::new(), Viewport::new(0.0, 800.0));
    tokio::time::sleep(Duration::from_millis(300)).await;

    h.layout_tx.send_replace(rows(5));
    h.viewport_tx.send_replace(Viewport::new(10.0, 800.0));
    tokio::time::sleep(Duration::from_millis(50)).await;

    let exit = h.handle.shutdown().await;
    assert!(exit.attached);
    assert_eq!(exit.released, 0);
    assert_eq!(exit.batches_sent, 0);
    let mut events_rx = h.events_rx;
    assert!(events_rx.recv().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn rows_scrolled_under_the_header_leave_the_visible_set() {
    let mut h = start(rows(10), Viewport::new(0.0, 520.0));
    let mut visible = VisibilitySet::new();

    let batch = h.events_rx.recv().await.expect("initial batch");
    visible.apply_all(&batch);
    // r4 starts exactly on the bottom edge and counts as intersecting.
    assert_eq!(sorted_ids(&visible), vec!["r0", "r1", "r2", "r3", "r4"]);

    h.viewport_tx.send_replace(Viewport::new(250.0, 520.0));
    let batch = h.events_rx.recv().await.expect("scroll batch");
    visible.apply_all(&batch);
    assert_eq!(sorted_ids(&visible), vec!["r2", "r3", "r4", "r5", "r6"]);

    h.handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn unmounted_rows_are_retracted() {
    let mut h = start(rows(4), Viewport::new(0.0, 800.0));
    let mut visible = VisibilitySet::new();
    visible.apply_all(&h.events_rx.recv().await.expect("initial batch"));
    assert_eq!(visible.len(), 4);

    h.layout_tx.send_modify(|layout| {
        layout.unmount("r1");
    });
    let batch = h.events_rx.recv().await.expect("retraction batch");
    assert_eq!(batch.len(), 1);
    assert_eq!(batch[0].item_id, "r1");
    assert!(!batch[0].is_visible);
    visible.apply_all(&batch);
    assert!(!visible.contains("r1"));

    let exit = h.handle.shutdown().await;
    assert_eq!(exit.released, 3);
}

#[tokio::test(start_paused = true)]
async fn dropping_the_viewport_source_stops_the_tracker() {
    let mut h = start(rows(2), Viewport::new(0.0, 800.0));
    h.events_rx.recv().await.expect("initial batch");

    drop(h.viewport_tx);
    assert!(h.events_rx.recv().await.is_none());
    let exit = h.handle.shutdown().await;
    assert_eq!(exit.released, 2);
    drop(h.layout_tx);
}

#[tokio::test(start_paused = true)]
async fn scrolling_republishes_position_bounded_totals() {
    let items = uniform_items(10, 1.0);
    let ids: Vec<&str> = items.iter().map(|item| item.id.as_str()).collect();
    let layout = LayoutSnapshot::stacked(ids, LIST_TOP, ROW_HEIGHT);

    let (layout_tx, layout_rx) = watch::channel(layout);
    let (viewport_tx, viewport_rx) = watch::channel(Viewport::new(0.0, 400.0));
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let handle =
        VisibilityTracker::new(TrackerConfig::default()).spawn(layout_rx, viewport_rx, events_tx);
    let (mut totals_rx, publisher) =
        TotalsPublisher::new(TotalsEngine::default(), items).spawn(events_rx);

    // Before the tracker attaches, the first five rows are summed.
    let initial = totals_rx.borrow_and_update().clone();
    assert_eq!(initial.revision, 0);
    assert_eq!(initial.totals.small, 5.0);

    totals_rx.changed().await.expect("first publish");
    let first = totals_rx.borrow_and_update().clone();
    assert_eq!(first.furthest_visible.as_deref(), Some("row-2"));
    assert_eq!(first.totals.small, 3.0);
    assert_eq!(first.totals.large, 300.0);
    assert_eq!(first.totals.medium_composite, 100.0);

    viewport_tx.send_replace(Viewport::new(500.0, 400.0));
    totals_rx.changed().await.expect("scroll publish");
    let second = totals_rx.borrow_and_update().clone();
    assert!(second.revision > first.revision);
    assert_eq!(second.furthest_visible.as_deref(), Some("row-7"));
    assert_eq!(second.totals.small, 8.0);

    handle.shutdown().await;
    let visible = publisher.await.expect("publisher task");
    assert!(visible.contains("row-7"));
    drop(layout_tx);
}

#[tokio::test(start_paused = true)]
async fn reference_catalog_totals_match_visible_row() {
    let items = reference_items();
    let ids: Vec<&str> = items.iter().map(|item| item.id.as_str()).collect();
    let (_layout_tx, layout_rx) =
        watch::channel(LayoutSnapshot::stacked(ids, LIST_TOP, ROW_HEIGHT));
    // Region [120, 300): "a" fully and "b" partially visible.
    let (_viewport_tx, viewport_rx) = watch::channel(Viewport::new(0.0, 300.0));
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let handle =
        VisibilityTracker::new(TrackerConfig::default()).spawn(layout_rx, viewport_rx, events_tx);
    let (mut totals_rx, _publisher) =
        TotalsPublisher::new(TotalsEngine::default(), items).spawn(events_rx);

    totals_rx.changed().await.expect("first publish");
    let snapshot = totals_rx.borrow_and_update().clone();
    assert_eq!(snapshot.furthest_visible.as_deref(), Some("b"));
    assert_eq!(snapshot.totals.small, 70_000.0);
    assert_eq!(snapshot.totals.medium_composite, 495.0);
    assert_eq!(snapshot.totals.medium_alternative, 4_062.0);

    handle.shutdown().await;
}
