use crate::geometry::{intersect, Bounds, Intersection, Viewport};
use costscope_core::VisibilityChange;

/// Sticky header height the observed region starts below.
pub const DEFAULT_TOP_MARGIN: f64 = 120.0;

/// Intersection ratios that trigger a notification when crossed.
pub const DEFAULT_THRESHOLDS: &[f64] = &[0.0, 0.1, 0.5];

#[derive(Debug, Clone, PartialEq)]
pub struct ObserverOptions {
    pub top_margin: f64,
    /// Sorted ascending, each within `0.0..=1.0`.
    pub thresholds: Vec<f64>,
}

impl Default for ObserverOptions {
    fn default() -> Self {
        Self {
            top_margin: DEFAULT_TOP_MARGIN,
            thresholds: DEFAULT_THRESHOLDS.to_vec(),
        }
    }
}

impl ObserverOptions {
    /// Number of thresholds the intersection has reached. A zero threshold
    /// is reached by intersecting at all, even with a zero ratio.
    fn crossed(&self, hit: &Intersection) -> usize {
        self.thresholds
            .iter()
            .filter(|&&t| {
                if t == 0.0 {
                    hit.is_intersecting
                } else {
                    hit.is_intersecting && hit.ratio >= t
                }
            })
            .count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ThresholdState {
    is_intersecting: bool,
    crossed: usize,
}

#[derive(Debug, Clone)]
struct Target {
    id: String,
    bounds: Bounds,
    /// `None` until the first evaluation after `observe`.
    last: Option<ThresholdState>,
}

/// Synchronous intersection bookkeeping for a set of observed elements.
///
/// Mirrors the platform facility: every newly observed target gets one
/// initial notification, after which a target is only reported again when
/// it crosses a threshold or starts/stops intersecting.
#[derive(Debug, Clone, Default)]
pub struct IntersectionObserver {
    options: ObserverOptions,
    targets: Vec<Target>,
}

impl IntersectionObserver {
    pub fn new(options: ObserverOptions) -> Self {
        Self {
            options,
            targets: Vec::new(),
        }
    }

    /// Start observing `id`. Returns false if it was already observed, in
    /// which case only its bounds are updated.
    pub fn observe(&mut self, id: &str, bounds: Bounds) -> bool {
        if self.update_bounds(id, bounds) {
            return false;
        }
        self.targets.push(Target {
            id: id.to_string(),
            bounds,
            last: None,
        });
        true
    }

    /// Stop observing `id`. If it was last reported visible, returns the
    /// change retracting it so callers can keep their visible set in sync.
    pub fn unobserve(&mut self, id: &str) -> Option<VisibilityChange> {
        let idx = self.targets.iter().position(|t| t.id == id)?;
        let target = self.targets.remove(idx);
        target
            .last
            .filter(|state| state.is_intersecting)
            .map(|_| VisibilityChange::new(target.id, false, 0.0))
    }

    pub fn update_bounds(&mut self, id: &str, bounds: Bounds) -> bool {
        match self.targets.iter_mut().find(|t| t.id == id) {
            Some(target) => {
                target.bounds = bounds;
                true
            }
            None => false,
        }
    }

    /// Compute the batch of notifications for the current viewport, in
    /// observation order.
    pub fn evaluate(&mut self, viewport: &Viewport) -> Vec<VisibilityChange> {
        let options = &self.options;
        self.targets
            .iter_mut()
            .filter_map(|target| {
                let hit = intersect(&target.bounds, viewport, options.top_margin);
                let state = ThresholdState {
                    is_intersecting: hit.is_intersecting,
                    crossed: options.crossed(&hit),
                };
                if target.last == Some(state) {
                    return None;
                }
                target.last = Some(state);
                Some(VisibilityChange::new(
                    target.id.clone(),
                    hit.is_intersecting,
                    hit.ratio,
                ))
            })
            .collect()
    }

    /// Release every target. Returns how many were observed.
    pub fn disconnect(&mut self) -> usize {
        let released = self.targets.len();
        self.targets.clear();
        released
    }

    pub fn observed_ids(&self) -> impl Iterator<Item = &str> {
        self.targets.iter().map(|t| t.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}
