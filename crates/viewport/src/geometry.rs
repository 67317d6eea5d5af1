use serde::{Deserialize, Serialize};

/// Vertical extent of an element in document coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub top: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(top: f64, height: f64) -> Self {
        Self {
            top,
            height: height.max(0.0),
        }
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// The scrolled window onto the list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub scroll_top: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(scroll_top: f64, height: f64) -> Self {
        Self { scroll_top, height }
    }

    /// Document-space `(top, bottom)` of the region below a header of
    /// `top_margin` pixels. May be empty (`top > bottom`).
    pub fn observed_region(&self, top_margin: f64) -> (f64, f64) {
        (
            self.scroll_top + top_margin,
            self.scroll_top + self.height,
        )
    }
}

/// Intersection of one element with the observed region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    /// The element overlaps or touches the region.
    pub is_intersecting: bool,
    /// Visible fraction of the element's height.
    pub ratio: f64,
}

pub fn intersect(bounds: &Bounds, viewport: &Viewport, top_margin: f64) -> Intersection {
    let (region_top, region_bottom) = viewport.observed_region(top_margin);
    if region_top > region_bottom {
        return Intersection {
            is_intersecting: false,
            ratio: 0.0,
        };
    }

    let overlap_top = bounds.top.max(region_top);
    let overlap_bottom = bounds.bottom().min(region_bottom);
    let overlap = overlap_bottom - overlap_top;
    if overlap < 0.0 {
        return Intersection {
            is_intersecting: false,
            ratio: 0.0,
        };
    }

    let ratio = if bounds.height > 0.0 {
        (overlap / bounds.height).clamp(0.0, 1.0)
    } else {
        1.0
    };
    Intersection {
        is_intersecting: true,
        ratio,
    }
}

/// Mounted elements and their bounds, in list order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutSnapshot {
    elements: Vec<(String, Bounds)>,
}

impl LayoutSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lay `ids` out as a vertical stack of equal-height rows starting at
    /// `top`.
    pub fn stacked<'a>(ids: impl IntoIterator<Item = &'a str>, top: f64, row_height: f64) -> Self {
        let elements = ids
            .into_iter()
            .enumerate()
            .map(|(idx, id)| {
                (
                    id.to_string(),
                    Bounds::new(top + idx as f64 * row_height, row_height),
                )
            })
            .collect();
        Self { elements }
    }

    pub fn unmount(&mut self, id: &str) -> Option<Bounds> {
        let idx = self.elements.iter().position(|(existing, _)| existing == id)?;
        Some(self.elements.remove(idx).1)
    }

    pub fn get(&self, id: &str) -> Option<Bounds> {
        self.elements
            .iter()
            .find(|(existing, _)| existing == id)
            .map(|(_, bounds)| *bounds)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Bounds)> {
        self.elements.iter().map(|(id, bounds)| (id.as_str(), *bounds))
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}
