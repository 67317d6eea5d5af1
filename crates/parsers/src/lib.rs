//! Tolerant parsing of the free-text cost reports attached to catalog items.

pub(crate) mod common;
pub mod report;

pub use report::{classify_line, parse_report, render_report, LineKind};
