use anyhow::Result;
use costscope_core::totals::furthest_visible_index;
use costscope_core::{Catalog, TotalsEngine, VisibilitySet};
use std::io::Write;

use crate::output::{self, OutputFormat};

/// Run the `totals` command against an explicit visible set.
pub fn run_totals(
    catalog: &Catalog,
    engine: &TotalsEngine,
    visible_ids: &[String],
    format: &OutputFormat,
) -> Result<()> {
    for id in visible_ids {
        if catalog.get(id).is_none() {
            tracing::warn!("Visible id not in catalog: {id}");
        }
    }
    let visible: VisibilitySet = visible_ids.iter().cloned().collect();
    let totals = engine.compute(catalog.items(), &visible);
    let furthest =
        furthest_visible_index(catalog.items(), &visible).map(|idx| &catalog.items()[idx].id);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match format {
        OutputFormat::Json => {
            let data = serde_json::json!({
                "visible": visible,
                "furthest_visible": furthest,
                "totals": totals,
                "rules": engine.rules(),
            });
            output::write_json(&mut out, "totals", "cumulative totals", data)?;
        }
        OutputFormat::Text => {
            match furthest {
                Some(id) => writeln!(out, "Through: {id}")?,
                None if visible.is_empty() => writeln!(out, "Through: first rows (nothing visible)")?,
                None => writeln!(out, "Through: nothing (no visible id is in the catalog)")?,
            }
            output::render_totals_text(&totals, engine.rules(), &mut out)?;
        }
    }
    Ok(())
}
