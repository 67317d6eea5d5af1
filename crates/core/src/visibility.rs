use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A single intersection change reported for one item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisibilityChange {
    pub item_id: String,
    pub is_visible: bool,
    /// Fraction of the item's height inside the viewport, `0.0..=1.0`.
    pub ratio: f64,
}

impl VisibilityChange {
    pub fn new(item_id: impl Into<String>, is_visible: bool, ratio: f64) -> Self {
        Self {
            item_id: item_id.into(),
            is_visible,
            ratio,
        }
    }
}

/// Ids of the items currently intersecting the viewport.
///
/// Starts empty and is only mutated by applying tracker changes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VisibilitySet {
    ids: BTreeSet<String>,
}

impl VisibilitySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the id when visible, remove it otherwise. Returns true when the
    /// membership actually changed.
    pub fn apply(&mut self, change: &VisibilityChange) -> bool {
        if change.is_visible {
            self.ids.insert(change.item_id.clone())
        } else {
            self.ids.remove(&change.item_id)
        }
    }

    /// Apply a whole batch in order; returns true if any membership changed.
    pub fn apply_all<'a>(&mut self, changes: impl IntoIterator<Item = &'a VisibilityChange>) -> bool {
        changes
            .into_iter()
            .fold(false, |changed, change| self.apply(change) | changed)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for VisibilitySet {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self {
            ids: iter.into_iter().map(Into::into).collect(),
        }
    }
}
