use anyhow::Result;
use costscope_core::Catalog;
use std::io::Write;

use crate::output::{self, OutputFormat};

/// Run the `list` command.
pub fn run_list(catalog: &Catalog, format: &OutputFormat) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match format {
        OutputFormat::Json => output::write_json(
            &mut out,
            "catalog",
            &format!("{} items", catalog.len()),
            serde_json::to_value(catalog)?,
        )?,
        OutputFormat::Text => {
            if catalog.is_empty() {
                eprintln!("Catalog is empty.");
                return Ok(());
            }
            output::render_catalog_text(catalog.items(), &mut out)?;
            writeln!(out)?;
            writeln!(out, "▸ detailed breakdown available (costscope report --item ID)")?;
        }
    }
    Ok(())
}
