use crate::{CostItem, ItemDetails, TierCosts};

/// Item priced only at the 100-user tier.
pub fn small_item(id: &str, amount: f64) -> CostItem {
    CostItem::new(
        id,
        TierCosts {
            small: Some(amount),
            ..Default::default()
        },
    )
}

/// Item priced only at the 1,000-user tier.
pub fn medium_item(id: &str, amount: f64) -> CostItem {
    CostItem::new(
        id,
        TierCosts {
            medium: Some(amount),
            ..Default::default()
        },
    )
}

/// Item with all three tiers set.
pub fn item(id: &str, small: f64, medium: f64, large: f64) -> CostItem {
    CostItem::new(
        id,
        TierCosts {
            small: Some(small),
            medium: Some(medium),
            large: Some(large),
        },
    )
}

/// Attach a breakdown report to an item.
pub fn with_report(mut item: CostItem, breakdown: &str) -> CostItem {
    item.details = Some(ItemDetails {
        breakdown: Some(breakdown.to_string()),
        ..Default::default()
    });
    item
}

/// The six-item sequence used throughout the totals tests:
/// two usage rows followed by the composite stack and its alternative.
pub fn reference_items() -> Vec<CostItem> {
    vec![
        small_item("a", 60_000.0),
        small_item("b", 10_000.0),
        medium_item("database", 25.0),
        medium_item("frontend", 20.0),
        medium_item("backend", 450.0),
        medium_item("aws", 4_062.0),
    ]
}

/// `count` items of uniform height-independent cost, ids `row-0..`.
pub fn uniform_items(count: usize, small: f64) -> Vec<CostItem> {
    (0..count)
        .map(|i| item(&format!("row-{i}"), small, small * 10.0, small * 100.0))
        .collect()
}
