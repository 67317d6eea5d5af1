use anyhow::{bail, Result};
use costscope_core::Catalog;
use costscope_runtime_config::CostscopeConfig;
use costscope_viewport::{
    LayoutSnapshot, TotalsPublisher, TotalsSnapshot, Viewport, VisibilityTracker,
};
use serde::Serialize;
use std::io::Write;
use std::time::Duration;
use tokio::sync::{mpsc, watch};

use crate::config::{totals_engine, tracker_config};
use crate::output::{self, format_currency, OutputFormat};

/// Frames to wait past the settle delay for the initial publish.
const ATTACH_GRACE_FRAMES: u32 = 4;

#[derive(Debug, Serialize)]
struct ScrollStep {
    /// `None` for the snapshot published before observers attach.
    offset: Option<f64>,
    #[serde(flatten)]
    snapshot: TotalsSnapshot,
}

/// Run the `scroll` command: lay rows out at a fixed height, attach the
/// visibility tracker, then move the viewport through `offsets` and record
/// the totals published after each move.
pub async fn run_scroll(
    catalog: &Catalog,
    config: &CostscopeConfig,
    offsets: &[f64],
    format: &OutputFormat,
) -> Result<()> {
    if let Some(bad) = offsets.iter().find(|o| !o.is_finite() || **o < 0.0) {
        bail!("Scroll offsets must be non-negative numbers, got {bad}");
    }

    let steps = simulate(catalog, config, offsets).await?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match format {
        OutputFormat::Json => output::write_json(
            &mut out,
            "scroll",
            &format!("{} offsets", offsets.len()),
            serde_json::to_value(&steps)?,
        )?,
        OutputFormat::Text => render_steps_text(&steps, &mut out)?,
    }
    Ok(())
}

async fn simulate(
    catalog: &Catalog,
    config: &CostscopeConfig,
    offsets: &[f64],
) -> Result<Vec<ScrollStep>> {
    let tracker = tracker_config(config);
    let frame = Duration::from_millis(config.layout.frame_ms);
    let layout = LayoutSnapshot::stacked(
        catalog.items().iter().map(|item| item.id.as_str()),
        config.tracker.header_offset_px,
        config.layout.row_height_px,
    );
    let height = config.layout.viewport_height_px;

    let (layout_tx, layout_rx) = watch::channel(layout);
    let (viewport_tx, viewport_rx) = watch::channel(Viewport::new(0.0, height));
    let (events_tx, events_rx) = mpsc::unbounded_channel();

    let settle = tracker.settle_delay;
    let handle = VisibilityTracker::new(tracker).spawn(layout_rx, viewport_rx, events_tx);
    let (mut totals_rx, publisher) =
        TotalsPublisher::new(totals_engine(config), catalog.items().to_vec()).spawn(events_rx);

    let mut steps = vec![ScrollStep {
        offset: None,
        snapshot: totals_rx.borrow_and_update().clone(),
    }];

    let attach_wait = settle + frame * ATTACH_GRACE_FRAMES;
    if tokio::time::timeout(attach_wait, totals_rx.changed())
        .await
        .is_err()
    {
        tracing::debug!("No visibility batch after attach");
    }
    steps.push(ScrollStep {
        offset: Some(0.0),
        snapshot: totals_rx.borrow_and_update().clone(),
    });

    for &offset in offsets {
        viewport_tx.send_replace(Viewport::new(offset, height));
        // A move that changes no row state publishes nothing.
        let _ = tokio::time::timeout(frame, totals_rx.changed()).await;
        steps.push(ScrollStep {
            offset: Some(offset),
            snapshot: totals_rx.borrow_and_update().clone(),
        });
    }

    let exit = handle.shutdown().await;
    tracing::debug!(
        attached = exit.attached,
        released = exit.released,
        batches = exit.batches_sent,
        "Scroll simulation finished"
    );
    drop(layout_tx);
    if let Err(e) = publisher.await {
        tracing::warn!("Totals publisher failed: {e}");
    }
    Ok(steps)
}

fn render_steps_text(steps: &[ScrollStep], writer: &mut dyn Write) -> Result<()> {
    writeln!(
        writer,
        "{:>8}  {:<26}{:>12}{:>14}{:>14}{:>14}",
        "OFFSET", "THROUGH", "100", "1,000 (A)", "1,000 (B)", "10,000"
    )?;
    for step in steps {
        let offset = match step.offset {
            Some(px) => format!("{px:.0}"),
            None => "initial".to_string(),
        };
        let through = step.snapshot.furthest_visible.as_deref().unwrap_or("-");
        let totals = &step.snapshot.totals;
        writeln!(
            writer,
            "{:>8}  {:<26}{:>12}{:>14}{:>14}{:>14}",
            offset,
            through,
            format_currency(Some(totals.small)),
            format_currency(Some(totals.medium_composite)),
            format_currency(Some(totals.medium_alternative)),
            format_currency(Some(totals.large)),
        )?;
    }
    Ok(())
}
