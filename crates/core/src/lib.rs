pub mod catalog;
pub mod report;
pub mod totals;
pub mod visibility;

pub use catalog::{Catalog, CatalogError, CostItem, ItemDetails, ScaleTier, TierCosts};
pub use report::{ParsedReport, ReportRow, Section, SummaryRow};
pub use totals::{compute_totals, ExclusionRules, Totals, TotalsEngine};
pub use visibility::{VisibilityChange, VisibilitySet};

#[cfg(any(test, feature = "testing"))]
pub mod testing;
