//! Row windowing.
//!
//! Only the rows that intersect the viewport (plus an overscan margin) are
//! materialized. This module provides:
//! - [`RowGeometry`]: per-row height estimates
//! - [`OffsetCache`]: cumulative row offsets, rebuilt only when rows change
//! - [`WindowCalculator`]: maps a scroll position to a [`Window`]
//! - [`ScrollState`]: scroll offset, viewport and pending scroll requests

mod calculator;
mod geometry;
mod offsets;
mod scroll;

pub use calculator::*;
pub use geometry::*;
pub use offsets::*;
pub use scroll::*;
