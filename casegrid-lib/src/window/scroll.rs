//! Scroll position of the grid body.

use super::OffsetCache;

/// Scroll actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollRequest {
    /// Scroll by relative amount (positive = down, negative = up).
    Delta(i64),
    /// Scroll to absolute offset.
    ToOffset(u64),
    /// Scroll the minimum distance that makes the row at index visible.
    IntoView(usize),
    PageUp,
    PageDown,
    Home,
    End,
}

/// Scroll offset, viewport height and content height, in pixels.
///
/// The offset is kept within `0..=content_height - viewport`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrollState {
    offset: u64,
    viewport: u64,
    content_height: u64,
}

impl ScrollState {
    pub fn new(viewport: u64) -> Self {
        Self {
            viewport,
            ..Default::default()
        }
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn viewport(&self) -> u64 {
        self.viewport
    }

    pub fn content_height(&self) -> u64 {
        self.content_height
    }

    /// Maximum scroll offset (content_height - viewport).
    pub fn max_offset(&self) -> u64 {
        self.content_height.saturating_sub(self.viewport)
    }

    /// Current scroll progress (0.0 = top, 1.0 = bottom).
    pub fn progress(&self) -> f64 {
        let max = self.max_offset();
        if max == 0 {
            0.0
        } else {
            self.offset as f64 / max as f64
        }
    }

    /// Whether content exceeds viewport (scrolling needed).
    pub fn can_scroll(&self) -> bool {
        self.content_height > self.viewport
    }

    pub fn set_viewport(&mut self, height: u64) {
        self.viewport = height;
        self.offset = self.offset.min(self.max_offset());
    }

    /// Called whenever the materialized rows change.
    pub fn set_content_height(&mut self, height: u64) {
        self.content_height = height;
        self.offset = self.offset.min(self.max_offset());
    }

    pub fn reset(&mut self) {
        self.offset = 0;
    }

    /// Applies a scroll request against the current row offsets.
    pub fn apply(&mut self, request: ScrollRequest, offsets: &OffsetCache) {
        let max = self.max_offset();
        self.offset = match request {
            ScrollRequest::Delta(d) => {
                if d < 0 {
                    self.offset.saturating_sub(d.unsigned_abs())
                } else {
                    self.offset.saturating_add(d.unsigned_abs()).min(max)
                }
            }
            ScrollRequest::ToOffset(o) => o.min(max),
            ScrollRequest::PageUp => self.offset.saturating_sub(self.viewport),
            ScrollRequest::PageDown => self.offset.saturating_add(self.viewport).min(max),
            ScrollRequest::Home => 0,
            ScrollRequest::End => max,
            ScrollRequest::IntoView(index) => {
                let top = offsets.row_top(index);
                let bottom = top + u64::from(offsets.row_height(index));
                if top < self.offset {
                    top
                } else if bottom > self.offset + self.viewport {
                    bottom.saturating_sub(self.viewport).min(max)
                } else {
                    self.offset
                }
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::FixedHeight;

    fn state(rows: usize) -> (ScrollState, OffsetCache) {
        let offsets = OffsetCache::new(rows, &FixedHeight::new(10));
        let mut state = ScrollState::new(100);
        state.set_content_height(offsets.total_height());
        (state, offsets)
    }

    #[test]
    fn test_requests_are_clamped() {
        let (mut state, offsets) = state(50);
        state.apply(ScrollRequest::Delta(-5), &offsets);
        assert_eq!(state.offset(), 0);
        state.apply(ScrollRequest::End, &offsets);
        assert_eq!(state.offset(), 400);
        state.apply(ScrollRequest::PageDown, &offsets);
        assert_eq!(state.offset(), 400);
        state.apply(ScrollRequest::PageUp, &offsets);
        assert_eq!(state.offset(), 300);
        state.apply(ScrollRequest::ToOffset(9999), &offsets);
        assert_eq!(state.offset(), 400);
        state.apply(ScrollRequest::Home, &offsets);
        assert_eq!(state.offset(), 0);
    }

    #[test]
    fn test_into_view() {
        let (mut state, offsets) = state(50);
        state.apply(ScrollRequest::IntoView(20), &offsets);
        assert_eq!(state.offset(), 110);
        state.apply(ScrollRequest::IntoView(15), &offsets);
        assert_eq!(state.offset(), 110);
        state.apply(ScrollRequest::IntoView(2), &offsets);
        assert_eq!(state.offset(), 20);
    }

    #[test]
    fn test_shrinking_content_clamps_offset() {
        let (mut state, offsets) = state(50);
        state.apply(ScrollRequest::End, &offsets);
        state.set_content_height(150);
        assert_eq!(state.offset(), 50);
        assert!(state.can_scroll());
        state.set_viewport(200);
        assert_eq!(state.offset(), 0);
        assert!(!state.can_scroll());
    }
}
