//! Row height estimation.

/// Height estimate for rows in the current page.
pub trait RowGeometry: Send + Sync {
    /// Estimated height of the row at `index`, in pixels.
    fn estimate_size(&self, index: usize) -> u32;

    /// The shared height when every row has the same height.
    ///
    /// Uniform geometries skip the cumulative offset table entirely.
    fn uniform_size(&self) -> Option<u32> {
        None
    }
}

/// Every row has the same height.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedHeight(u32);

impl FixedHeight {
    /// Heights below one pixel are raised to one.
    pub fn new(height: u32) -> Self {
        Self(height.max(1))
    }

    pub fn height(&self) -> u32 {
        self.0
    }
}

impl Default for FixedHeight {
    fn default() -> Self {
        Self(42)
    }
}

impl RowGeometry for FixedHeight {
    fn estimate_size(&self, _index: usize) -> u32 {
        self.0
    }

    fn uniform_size(&self) -> Option<u32> {
        Some(self.0)
    }
}

/// Per-row heights from a closure.
pub struct EstimatedHeight<F>(F);

impl<F> EstimatedHeight<F>
where
    F: Fn(usize) -> u32 + Send + Sync,
{
    pub fn new(estimate: F) -> Self {
        Self(estimate)
    }
}

impl<F> RowGeometry for EstimatedHeight<F>
where
    F: Fn(usize) -> u32 + Send + Sync,
{
    fn estimate_size(&self, index: usize) -> u32 {
        (self.0)(index)
    }
}

impl<F> std::fmt::Debug for EstimatedHeight<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EstimatedHeight").finish_non_exhaustive()
    }
}
