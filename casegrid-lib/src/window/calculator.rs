//! Window calculation.

use std::ops::RangeInclusive;

use super::OffsetCache;

/// Inclusive range of row indices to render.
///
/// Always satisfies `first <= last < rows`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub first: usize,
    pub last: usize,
}

impl Window {
    /// Number of rows in the window.
    pub fn row_count(&self) -> usize {
        self.last - self.first + 1
    }

    pub fn contains(&self, index: usize) -> bool {
        (self.first..=self.last).contains(&index)
    }

    pub fn indices(&self) -> RangeInclusive<usize> {
        self.first..=self.last
    }
}

/// Computes the render window from a scroll position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowCalculator {
    overscan: usize,
}

impl Default for WindowCalculator {
    fn default() -> Self {
        Self { overscan: 5 }
    }
}

impl WindowCalculator {
    pub fn new(overscan: usize) -> Self {
        Self { overscan }
    }

    pub fn overscan(&self) -> usize {
        self.overscan
    }

    /// Rows covering `[scroll_offset, scroll_offset + viewport)` plus
    /// overscan on both sides. `None` when there are no rows.
    ///
    /// Each call is computed from scratch with two binary searches, so a
    /// jump to any offset yields a window that covers the viewport.
    pub fn compute(&self, offsets: &OffsetCache, scroll_offset: u64, viewport: u64) -> Option<Window> {
        if offsets.is_empty() {
            return None;
        }
        let last_row = offsets.len() - 1;
        let total = offsets.total_height();
        if viewport >= total {
            return Some(Window {
                first: 0,
                last: last_row,
            });
        }

        let offset = scroll_offset.min(total - viewport);
        let first = offsets.index_at(offset);
        let last = if viewport == 0 {
            first
        } else {
            offsets.index_at(offset + viewport - 1)
        };

        Some(Window {
            first: first.saturating_sub(self.overscan),
            last: last.saturating_add(self.overscan).min(last_row),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::EstimatedHeight;
    use crate::window::FixedHeight;

    fn rows(n: usize) -> OffsetCache {
        OffsetCache::new(n, &FixedHeight::new(42))
    }

    #[test]
    fn test_empty_rows() {
        assert_eq!(WindowCalculator::default().compute(&rows(0), 0, 600), None);
    }

    #[test]
    fn test_top_of_list() {
        let window = WindowCalculator::default().compute(&rows(100), 0, 600).unwrap();
        // 600 / 42 -> rows 0..=14 visible, plus five overscan.
        assert_eq!(window, Window { first: 0, last: 19 });
    }

    #[test]
    fn test_middle_of_list() {
        let window = WindowCalculator::default().compute(&rows(100), 42 * 40, 420).unwrap();
        assert_eq!(window, Window { first: 35, last: 54 });
        assert_eq!(window.row_count(), 20);
    }

    #[test]
    fn test_jump_past_end_is_clamped() {
        let offsets = rows(100);
        let window = WindowCalculator::default()
            .compute(&offsets, u64::MAX, 420)
            .unwrap();
        assert_eq!(window.last, 99);
        assert!(window.contains(90));
    }

    #[test]
    fn test_viewport_taller_than_content() {
        let window = WindowCalculator::default().compute(&rows(7), 300, 600).unwrap();
        assert_eq!(window, Window { first: 0, last: 6 });
    }

    #[test]
    fn test_window_covers_viewport() {
        let geometry = EstimatedHeight::new(|i| 20 + (i as u32 * 7) % 50);
        let viewport = 300;
        for len in [1, 2, 5, 8, 40, 500] {
            let offsets = OffsetCache::new(len, &geometry);
            let total = offsets.total_height();
            let max = total.saturating_sub(viewport);
            for calculator in [WindowCalculator::new(0), WindowCalculator::default()] {
                // Past-the-end offsets are clamped like any other.
                for offset in (0..=max + 100).step_by(37) {
                    let window = calculator.compute(&offsets, offset, viewport).unwrap();
                    assert!(window.first <= window.last, "len {len} offset {offset}");
                    assert!(window.last < len, "len {len} offset {offset}");

                    let top = offset.min(max);
                    let bottom = (top + viewport).min(total);
                    let end = offsets.row_top(window.last) + u64::from(offsets.row_height(window.last));
                    assert!(offsets.row_top(window.first) <= top, "len {len} offset {offset}");
                    assert!(end >= bottom, "len {len} offset {offset}");
                }
            }
        }
    }
}
