use anyhow::{Context, Result};
use costscope_core::{Catalog, CostItem, ParsedReport, ScaleTier};
use costscope_parsers::parse_report;
use std::io::Write;
use std::path::Path;

use crate::output::{self, format_currency, OutputFormat};

/// Show the detail view for one catalog item.
pub fn run_item_report(catalog: &Catalog, id: &str, format: &OutputFormat) -> Result<()> {
    let item = catalog
        .get(id)
        .with_context(|| format!("No catalog item with id '{id}'"))?;
    let report = item.report_blob().map(parse_report).unwrap_or_default();

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match format {
        OutputFormat::Json => {
            let data = serde_json::json!({
                "item": item,
                "report": report,
            });
            output::write_json(&mut out, "report", item.title(), data)?;
        }
        OutputFormat::Text => render_item_text(item, &report, &mut out)?,
    }
    Ok(())
}

/// Parse a standalone report file.
pub fn run_file_report(path: &Path, format: &OutputFormat) -> Result<()> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read report at {}", path.display()))?;
    let report = parse_report(&text);
    if report.is_empty() {
        tracing::warn!("No sections found in {}", path.display());
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match format {
        OutputFormat::Json => output::write_json(
            &mut out,
            "report",
            &format!(
                "{} sections, {} rows",
                report.sections.len(),
                report.row_count()
            ),
            serde_json::to_value(&report)?,
        )?,
        OutputFormat::Text => {
            if report.is_empty() {
                writeln!(out, "{}", text.trim_end())?;
            } else {
                output::render_report_text(&report, &mut out)?;
            }
        }
    }
    Ok(())
}

fn render_item_text(item: &CostItem, report: &ParsedReport, out: &mut dyn Write) -> Result<()> {
    writeln!(out, "{}", item.title())?;
    for line in item.app.lines().skip(1) {
        writeln!(out, "  {}", line.trim())?;
    }
    writeln!(out)?;

    writeln!(out, "Monthly cost")?;
    for tier in ScaleTier::ALL {
        writeln!(
            out,
            "  {:<14}{:>14}",
            tier.label(),
            format_currency(item.costs.get(tier))
        )?;
    }

    if let Some(details) = &item.details {
        for (heading, body) in [
            ("Why", &details.why),
            ("How", &details.how),
            ("Where", &details.location),
        ] {
            if body.trim().is_empty() {
                continue;
            }
            writeln!(out)?;
            writeln!(out, "{heading}")?;
            writeln!(out, "  {}", body.trim())?;
        }
    }

    if let Some(blob) = item.report_blob() {
        writeln!(out)?;
        writeln!(out, "Cost breakdown")?;
        if report.is_empty() {
            // Not tabular; show it as written.
            writeln!(out, "{}", blob.trim_end())?;
        } else {
            output::render_report_text(report, out)?;
        }
    }

    if !item.notes.trim().is_empty() {
        writeln!(out)?;
        writeln!(out, "Notes")?;
        for line in item.notes.lines() {
            writeln!(out, "  {}", line.trim_end())?;
        }
    }
    Ok(())
}
