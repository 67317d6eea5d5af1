//! Scroll-scoped running totals.
//!
//! Two strategies share one [`Totals`] value:
//!
//! - the small and large tiers are *position bounded*: they sum every item up
//!   to and including the furthest visible one, so rows scrolled past keep
//!   counting even once they leave the viewport;
//! - the medium tier is summed over the whole catalog twice, once per
//!   exclusion set, producing the "composite stack" and "alternative"
//!   figures that must never be added together.

use crate::catalog::{CostItem, ScaleTier};
use crate::visibility::VisibilitySet;
use serde::{Deserialize, Serialize};

/// Items summed by the position-bounded totals while nothing is visible yet.
pub const EMPTY_VISIBILITY_PREFIX: usize = 5;

/// Id of the all-in-one alternative item excluded from the composite total.
pub const DEFAULT_ALTERNATIVE_IDS: &[&str] = &["aws"];

/// Ids of the composite-stack items the alternative replaces.
pub const DEFAULT_COMPOSITE_IDS: &[&str] = &["database", "frontend", "backend"];

/// Snapshot of the four running sums.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    /// 100-user tier, position bounded.
    pub small: f64,
    /// 1,000-user tier over all items except the alternative.
    pub medium_composite: f64,
    /// 1,000-user tier over all items except the composite stack.
    pub medium_alternative: f64,
    /// 10,000-user tier, position bounded.
    pub large: f64,
}

/// Exclusion sets for the two medium-tier totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusionRules {
    /// Excluded from [`Totals::medium_composite`].
    pub alternative_ids: Vec<String>,
    /// Excluded from [`Totals::medium_alternative`].
    pub composite_ids: Vec<String>,
}

impl Default for ExclusionRules {
    fn default() -> Self {
        Self {
            alternative_ids: DEFAULT_ALTERNATIVE_IDS
                .iter()
                .map(|id| (*id).to_string())
                .collect(),
            composite_ids: DEFAULT_COMPOSITE_IDS
                .iter()
                .map(|id| (*id).to_string())
                .collect(),
        }
    }
}

/// Stateless totals calculator. Every call rescans the full sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TotalsEngine {
    rules: ExclusionRules,
    fallback_prefix: usize,
}

impl Default for TotalsEngine {
    fn default() -> Self {
        Self::new(ExclusionRules::default())
    }
}

impl TotalsEngine {
    pub fn new(rules: ExclusionRules) -> Self {
        Self {
            rules,
            fallback_prefix: EMPTY_VISIBILITY_PREFIX,
        }
    }

    pub fn with_fallback_prefix(mut self, fallback_prefix: usize) -> Self {
        self.fallback_prefix = fallback_prefix;
        self
    }

    pub fn rules(&self) -> &ExclusionRules {
        &self.rules
    }

    pub fn compute(&self, items: &[CostItem], visible: &VisibilitySet) -> Totals {
        let bound = if visible.is_empty() {
            self.fallback_prefix.min(items.len())
        } else {
            // Ids outside `items` cannot bound anything.
            furthest_visible_index(items, visible).map_or(0, |idx| idx + 1)
        };
        let scrolled_past = &items[..bound];

        Totals {
            small: sum_tier(scrolled_past.iter(), ScaleTier::Small),
            medium_composite: sum_tier(
                items
                    .iter()
                    .filter(|item| !self.rules.alternative_ids.contains(&item.id)),
                ScaleTier::Medium,
            ),
            medium_alternative: sum_tier(
                items
                    .iter()
                    .filter(|item| !self.rules.composite_ids.contains(&item.id)),
                ScaleTier::Medium,
            ),
            large: sum_tier(scrolled_past.iter(), ScaleTier::Large),
        }
    }
}

/// Compute totals with the default exclusion sets and fallback prefix.
pub fn compute_totals(items: &[CostItem], visible: &VisibilitySet) -> Totals {
    TotalsEngine::default().compute(items, visible)
}

/// Index of the last item in sequence order whose id is visible.
///
/// Visible ids that do not belong to `items` are ignored.
pub fn furthest_visible_index(items: &[CostItem], visible: &VisibilitySet) -> Option<usize> {
    if visible.is_empty() {
        return None;
    }
    items.iter().rposition(|item| visible.contains(&item.id))
}

fn sum_tier<'a>(items: impl Iterator<Item = &'a CostItem>, tier: ScaleTier) -> f64 {
    items.map(|item| item.costs.summable(tier)).sum()
}
