//! Shared runtime configuration types.
//!
//! The `costscope` binary reads `costscope.toml` into [`CostscopeConfig`];
//! the tracker and totals crates take plain values derived from it so they do
//! not depend on this crate.

use serde::{Deserialize, Serialize};

/// Canonical config file name.
pub const CONFIG_FILE_NAME: &str = "costscope.toml";

/// Top-level configuration (persisted as `costscope.toml`).
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct CostscopeConfig {
    #[serde(default)]
    pub tracker: TrackerSettings,
    #[serde(default)]
    pub totals: TotalsSettings,
    #[serde(default)]
    pub layout: LayoutSettings,
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("threshold {0} is outside 0.0..=1.0")]
    ThresholdOutOfRange(f64),
    #[error("at least one intersection threshold is required")]
    NoThresholds,
    #[error("{field} must be a positive number, got {value}")]
    NonPositive { field: &'static str, value: f64 },
    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f64 },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Geometry and timing of the visibility tracker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrackerSettings {
    /// Height of the sticky header; items count as visible only below it.
    #[serde(default = "default_header_offset_px")]
    pub header_offset_px: f64,
    /// Intersection ratios that trigger a notification when crossed.
    #[serde(default = "default_thresholds")]
    pub thresholds: Vec<f64>,
    /// Wait before attaching observers to the mounted rows.
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            header_offset_px: default_header_offset_px(),
            thresholds: default_thresholds(),
            settle_delay_ms: default_settle_delay_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TotalsSettings {
    /// Rows summed by the scroll-bounded totals before anything is visible.
    #[serde(default = "default_fallback_prefix")]
    pub fallback_prefix: usize,
    /// Excluded from the composite-stack total.
    #[serde(default = "default_alternative_ids")]
    pub alternative_ids: Vec<String>,
    /// Excluded from the alternative total.
    #[serde(default = "default_composite_ids")]
    pub composite_ids: Vec<String>,
}

impl Default for TotalsSettings {
    fn default() -> Self {
        Self {
            fallback_prefix: default_fallback_prefix(),
            alternative_ids: default_alternative_ids(),
            composite_ids: default_composite_ids(),
        }
    }
}

/// Host-side list layout used when simulating a scrolled viewport.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LayoutSettings {
    #[serde(default = "default_row_height_px")]
    pub row_height_px: f64,
    #[serde(default = "default_viewport_height_px")]
    pub viewport_height_px: f64,
    /// Render interval the host waits between scroll steps.
    #[serde(default = "default_frame_ms")]
    pub frame_ms: u64,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            row_height_px: default_row_height_px(),
            viewport_height_px: default_viewport_height_px(),
            frame_ms: default_frame_ms(),
        }
    }
}

impl CostscopeConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the tracker cannot work with and normalize the rest.
    ///
    /// Thresholds are sorted and deduplicated.
    pub fn validate(&mut self) -> Result<()> {
        let tracker = &mut self.tracker;
        if tracker.thresholds.is_empty() {
            return Err(ConfigError::NoThresholds);
        }
        if let Some(bad) = tracker
            .thresholds
            .iter()
            .copied()
            .find(|t| !(0.0..=1.0).contains(t))
        {
            return Err(ConfigError::ThresholdOutOfRange(bad));
        }
        tracker.thresholds.sort_by(f64::total_cmp);
        tracker.thresholds.dedup();

        if !(tracker.header_offset_px.is_finite() && tracker.header_offset_px >= 0.0) {
            return Err(ConfigError::Negative {
                field: "tracker.header_offset_px",
                value: tracker.header_offset_px,
            });
        }
        for (field, value) in [
            ("layout.row_height_px", self.layout.row_height_px),
            ("layout.viewport_height_px", self.layout.viewport_height_px),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NonPositive { field, value });
            }
        }
        if self.layout.frame_ms == 0 {
            return Err(ConfigError::NonPositive {
                field: "layout.frame_ms",
                value: 0.0,
            });
        }
        Ok(())
    }
}

// ── Serde default functions ─────────────────────────────────────────────

fn default_header_offset_px() -> f64 {
    120.0
}
fn default_thresholds() -> Vec<f64> {
    vec![0.0, 0.1, 0.5]
}
fn default_settle_delay_ms() -> u64 {
    200
}
fn default_fallback_prefix() -> usize {
    5
}
fn default_alternative_ids() -> Vec<String> {
    vec!["aws".to_string()]
}
fn default_composite_ids() -> Vec<String> {
    vec![
        "database".to_string(),
        "frontend".to_string(),
        "backend".to_string(),
    ]
}
fn default_row_height_px() -> f64 {
    112.0
}
fn default_viewport_height_px() -> f64 {
    900.0
}
fn default_frame_ms() -> u64 {
    16
}
