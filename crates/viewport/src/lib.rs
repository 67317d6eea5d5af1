//! Viewport-driven visibility tracking.
//!
//! Scroll input and row layout flow in through `watch` channels, visibility
//! changes flow out as batches, and [`TotalsPublisher`] folds those batches
//! into a visible set and republishes scroll-scoped totals.

pub mod geometry;
pub mod observer;
pub mod publisher;
pub mod tracker;

pub use geometry::{Bounds, LayoutSnapshot, Viewport};
pub use observer::{IntersectionObserver, ObserverOptions};
pub use publisher::{TotalsPublisher, TotalsSnapshot};
pub use tracker::{TrackerConfig, TrackerExit, TrackerHandle, VisibilityBatch, VisibilityTracker};
