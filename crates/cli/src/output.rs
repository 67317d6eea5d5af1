use std::io::Write;

use anyhow::Result;
use costscope_core::{CostItem, ExclusionRules, ParsedReport, ScaleTier, Totals};

/// Placeholder shown for amounts with no data.
pub const MISSING_AMOUNT: &str = "—";

const TITLE_WIDTH: usize = 44;
const AMOUNT_WIDTH: usize = 14;

/// Output format for command results.
#[derive(Debug, Clone, PartialEq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Structured output envelope (Terraform/ripgrep pattern).
#[derive(Debug, serde::Serialize)]
pub struct OutputEnvelope {
    pub version: &'static str,
    #[serde(rename = "type")]
    pub data_type: String,
    #[serde(rename = "@message")]
    pub message: String,
    #[serde(rename = "@timestamp")]
    pub timestamp: String,
    pub data: serde_json::Value,
}

impl OutputEnvelope {
    pub fn new(data_type: &str, message: &str, data: serde_json::Value) -> Self {
        Self {
            version: "0.1",
            data_type: data_type.to_string(),
            message: message.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            data,
        }
    }
}

pub fn write_json(
    writer: &mut dyn Write,
    data_type: &str,
    message: &str,
    data: serde_json::Value,
) -> Result<()> {
    let envelope = OutputEnvelope::new(data_type, message, data);
    serde_json::to_writer_pretty(&mut *writer, &envelope)?;
    writeln!(writer)?;
    Ok(())
}

/// Integer-rounded dollars with thousands separators; absent or non-numeric
/// values render as an em-dash.
pub fn format_currency(value: Option<f64>) -> String {
    match value.filter(|v| v.is_finite()) {
        Some(v) => format!("${}", group_thousands(v.round() as i64)),
        None => MISSING_AMOUNT.to_string(),
    }
}

fn group_thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut out: String = text.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

fn pad(text: &str, width: usize) -> String {
    let len = text.chars().count();
    format!("{text}{}", " ".repeat(width.saturating_sub(len)))
}

fn pad_left(text: &str, width: usize) -> String {
    let len = text.chars().count();
    format!("{}{text}", " ".repeat(width.saturating_sub(len)))
}

pub fn render_catalog_text(items: &[CostItem], writer: &mut dyn Write) -> Result<()> {
    write!(writer, "{:>3}  {}", "#", pad("SERVICE / APPLICATION", TITLE_WIDTH))?;
    for tier in ScaleTier::ALL {
        write!(writer, "{}", pad_left(tier.label(), AMOUNT_WIDTH))?;
    }
    writeln!(writer)?;
    writeln!(writer, "{}", "─".repeat(5 + TITLE_WIDTH + AMOUNT_WIDTH * 3))?;

    for (idx, item) in items.iter().enumerate() {
        let marker = if item.report_blob().is_some() { "  ▸" } else { "" };
        write!(
            writer,
            "{:>3}  {}",
            idx + 1,
            pad(&truncate(item.title(), TITLE_WIDTH), TITLE_WIDTH)
        )?;
        for tier in ScaleTier::ALL {
            write!(
                writer,
                "{}",
                pad_left(&format_currency(item.costs.get(tier)), AMOUNT_WIDTH)
            )?;
        }
        writeln!(writer, "{marker}")?;
        if let Some(note) = item.headline_note() {
            writeln!(writer, "     ⓘ {}", truncate(note, TITLE_WIDTH + AMOUNT_WIDTH))?;
        }
    }
    Ok(())
}

pub fn render_totals_text(
    totals: &Totals,
    rules: &ExclusionRules,
    writer: &mut dyn Write,
) -> Result<()> {
    let composite = format!(
        "1,000 Users (composite stack, excl. {})",
        rules.alternative_ids.join(", ")
    );
    let alternative = format!(
        "1,000 Users (alternative, excl. {})",
        rules.composite_ids.join(", ")
    );
    let rows = [
        (ScaleTier::Small.label().to_string(), totals.small),
        (composite, totals.medium_composite),
        (alternative, totals.medium_alternative),
        (ScaleTier::Large.label().to_string(), totals.large),
    ];

    writeln!(writer, "CUMULATIVE TOTAL")?;
    for (label, amount) in rows {
        writeln!(
            writer,
            "  {}{}",
            pad(&label, TITLE_WIDTH + 12),
            pad_left(&format_currency(Some(amount)), AMOUNT_WIDTH)
        )?;
    }
    Ok(())
}

pub fn render_report_text(report: &ParsedReport, writer: &mut dyn Write) -> Result<()> {
    for (idx, section) in report.sections.iter().enumerate() {
        if idx > 0 {
            writeln!(writer)?;
        }
        writeln!(writer, "{}", section.title)?;

        let service_width = column_width(
            "Service",
            section
                .rows
                .iter()
                .map(|r| r.service.as_str())
                .chain(section.summary_rows.iter().map(|t| t.label.as_str())),
        );
        let config_width =
            column_width("Configuration", section.rows.iter().map(|r| r.configuration.as_str()));
        let cost_width = column_width(
            "Monthly Cost",
            section
                .rows
                .iter()
                .map(|r| r.cost.as_str())
                .chain(section.summary_rows.iter().map(|t| t.value.as_str())),
        );
        let rule = "─".repeat(service_width + config_width + cost_width + 4);

        writeln!(
            writer,
            "{}  {}  {}",
            pad("Service", service_width),
            pad("Configuration", config_width),
            pad_left("Monthly Cost", cost_width)
        )?;
        writeln!(writer, "{rule}")?;
        for row in &section.rows {
            writeln!(
                writer,
                "{}  {}  {}",
                pad(&row.service, service_width),
                pad(&row.configuration, config_width),
                pad_left(&row.cost, cost_width)
            )?;
        }
        if !section.summary_rows.is_empty() {
            writeln!(writer, "{rule}")?;
            for total in &section.summary_rows {
                writeln!(
                    writer,
                    "{}  {}",
                    pad(&total.label, service_width + config_width + 2),
                    pad_left(&total.value, cost_width)
                )?;
            }
        }
    }
    Ok(())
}

fn column_width<'a>(header: &str, cells: impl Iterator<Item = &'a str>) -> usize {
    cells
        .map(|cell| cell.chars().count())
        .chain(std::iter::once(header.chars().count()))
        .max()
        .unwrap_or(0)
}
