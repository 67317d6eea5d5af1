use anyhow::{Context, Result};
use costscope_runtime_config::CostscopeConfig;
use std::io::Write;
use std::path::Path;

use crate::config;
use crate::output::{self, OutputFormat};

/// `config --init`: write the default config to `--config PATH`, or the
/// canonical path.
pub fn run_init(target: Option<&Path>) -> Result<()> {
    let path = config::init_config(target)?;
    eprintln!("Wrote default config to {}", path.display());
    Ok(())
}

/// `config`: print the effective config and where it came from.
pub fn run_show(
    loaded: &CostscopeConfig,
    source: Option<&Path>,
    format: &OutputFormat,
) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match format {
        OutputFormat::Json => {
            let data = serde_json::json!({
                "path": source.map(|p| p.display().to_string()),
                "config": loaded,
            });
            output::write_json(&mut out, "config", "effective config", data)?;
        }
        OutputFormat::Text => {
            match source {
                Some(path) => writeln!(out, "# {}", path.display())?,
                None => writeln!(out, "# defaults (no config file)")?,
            }
            let content =
                toml::to_string_pretty(loaded).context("Failed to serialize config")?;
            write!(out, "{content}")?;
        }
    }
    Ok(())
}
