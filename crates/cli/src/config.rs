use anyhow::{bail, Context, Result};
use costscope_core::{ExclusionRules, TotalsEngine};
use costscope_runtime_config::{CostscopeConfig, CONFIG_FILE_NAME};
use costscope_viewport::{ObserverOptions, TrackerConfig};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Get the config directory path (~/.config/costscope/)
pub fn config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .context("Could not determine home directory")?;
    Ok(PathBuf::from(home).join(".config").join("costscope"))
}

/// Canonical config file path.
pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

fn read_config_file(path: &Path) -> Result<CostscopeConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config at {}", path.display()))?;
    CostscopeConfig::from_toml_str(&content)
        .with_context(|| format!("Failed to parse config at {}", path.display()))
}

/// Resolve the effective config: an explicit path must exist; otherwise the
/// canonical file is used when present, falling back to defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<(CostscopeConfig, Option<PathBuf>)> {
    if let Some(path) = explicit {
        return Ok((read_config_file(path)?, Some(path.to_path_buf())));
    }
    let path = config_path()?;
    if path.exists() {
        let config = read_config_file(&path)?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok((config, Some(path)))
    } else {
        Ok((CostscopeConfig::default(), None))
    }
}

/// Write the default config to `target`, or the canonical path. Refuses to
/// overwrite.
pub fn init_config(target: Option<&Path>) -> Result<PathBuf> {
    let path = match target {
        Some(path) => path.to_path_buf(),
        None => config_path()?,
    };
    if path.exists() {
        bail!("Config already exists at {}", path.display());
    }
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create config dir at {}", dir.display()))?;
    }
    let content = toml::to_string_pretty(&CostscopeConfig::default())
        .context("Failed to serialize config")?;
    std::fs::write(&path, content)
        .with_context(|| format!("Failed to write config at {}", path.display()))?;
    Ok(path)
}

pub fn tracker_config(config: &CostscopeConfig) -> TrackerConfig {
    TrackerConfig {
        observer: ObserverOptions {
            top_margin: config.tracker.header_offset_px,
            thresholds: config.tracker.thresholds.clone(),
        },
        settle_delay: Duration::from_millis(config.tracker.settle_delay_ms),
    }
}

pub fn totals_engine(config: &CostscopeConfig) -> TotalsEngine {
    TotalsEngine::new(ExclusionRules {
        alternative_ids: config.totals.alternative_ids.clone(),
        composite_ids: config.totals.composite_ids.clone(),
    })
    .with_fallback_prefix(config.totals.fallback_prefix)
}
