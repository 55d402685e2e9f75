//! Cumulative row offsets.

use super::RowGeometry;

/// Row offsets for one page of rows.
///
/// Uses cumulative height caching for O(1) position lookups and O(log n)
/// index lookups. Offsets are rebuilt only when the row set changes or a row
/// is measured, never on scroll.
#[derive(Debug, Clone, Default)]
pub struct OffsetCache {
    len: usize,
    /// Set while every row has the same height; `cumulative` is then empty.
    uniform: Option<u32>,
    /// `cumulative[i]` = total height of rows `0..i`
    /// `cumulative[0]` = 0, `cumulative[len]` = total content height
    cumulative: Vec<u64>,
}

impl OffsetCache {
    pub fn new(len: usize, geometry: &dyn RowGeometry) -> Self {
        let mut cache = Self::default();
        cache.reset(len, geometry);
        cache
    }

    /// Rebuilds the offsets for `len` rows.
    pub fn reset(&mut self, len: usize, geometry: &dyn RowGeometry) {
        self.len = len;
        self.cumulative.clear();
        self.uniform = geometry.uniform_size();
        if self.uniform.is_some() {
            return;
        }

        self.cumulative.reserve(len + 1);
        self.cumulative.push(0);
        let mut total = 0u64;
        for index in 0..len {
            total += u64::from(geometry.estimate_size(index));
            self.cumulative.push(total);
        }
    }

    /// Records the measured height of a row.
    ///
    /// Only offsets after `index` move.
    pub fn measure(&mut self, index: usize, height: u32) {
        if index >= self.len || self.row_height(index) == height {
            return;
        }
        if let Some(uniform) = self.uniform.take() {
            self.cumulative = (0..=self.len as u64).map(|i| i * u64::from(uniform)).collect();
        }

        let old = self.cumulative[index + 1] - self.cumulative[index];
        let new = u64::from(height);
        for offset in &mut self.cumulative[index + 1..] {
            *offset = *offset - old + new;
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Top edge of the row at `index`. Out-of-range indices report the total
    /// content height.
    pub fn row_top(&self, index: usize) -> u64 {
        let index = index.min(self.len);
        match self.uniform {
            Some(h) => index as u64 * u64::from(h),
            None => self.cumulative[index],
        }
    }

    pub fn row_height(&self, index: usize) -> u32 {
        if index >= self.len {
            return 0;
        }
        match self.uniform {
            Some(h) => h,
            None => u32::try_from(self.cumulative[index + 1] - self.cumulative[index])
                .unwrap_or(u32::MAX),
        }
    }

    pub fn total_height(&self) -> u64 {
        self.row_top(self.len)
    }

    /// Index of the first row whose bottom edge is below `y`, i.e. the row
    /// containing pixel `y`. Clamped to the last row.
    pub fn index_at(&self, y: u64) -> usize {
        if self.len == 0 {
            return 0;
        }
        let index = match self.uniform {
            Some(h) => usize::try_from(y / u64::from(h)).unwrap_or(usize::MAX),
            None => self.cumulative[1..].partition_point(|&bottom| bottom <= y),
        };
        index.min(self.len - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::EstimatedHeight;
    use crate::window::FixedHeight;

    #[test]
    fn test_uniform_offsets() {
        let cache = OffsetCache::new(100, &FixedHeight::new(42));
        assert_eq!(cache.row_top(0), 0);
        assert_eq!(cache.row_top(10), 420);
        assert_eq!(cache.total_height(), 4200);
        assert_eq!(cache.index_at(0), 0);
        assert_eq!(cache.index_at(41), 0);
        assert_eq!(cache.index_at(42), 1);
        assert_eq!(cache.index_at(1_000_000), 99);
    }

    #[test]
    fn test_variable_offsets() {
        let geometry = EstimatedHeight::new(|i| if i % 2 == 0 { 10 } else { 30 });
        let cache = OffsetCache::new(4, &geometry);
        assert_eq!(cache.row_top(1), 10);
        assert_eq!(cache.row_top(2), 40);
        assert_eq!(cache.total_height(), 80);
        assert_eq!(cache.row_height(3), 30);
        assert_eq!(cache.index_at(9), 0);
        assert_eq!(cache.index_at(10), 1);
        assert_eq!(cache.index_at(39), 1);
        assert_eq!(cache.index_at(40), 2);
    }

    #[test]
    fn test_measure_shifts_following_rows() {
        let mut cache = OffsetCache::new(5, &FixedHeight::new(20));
        cache.measure(1, 50);
        assert_eq!(cache.row_top(1), 20);
        assert_eq!(cache.row_top(2), 70);
        assert_eq!(cache.row_height(1), 50);
        assert_eq!(cache.total_height(), 130);

        cache.measure(1, 20);
        assert_eq!(cache.total_height(), 100);

        // Ignored.
        cache.measure(9, 500);
        assert_eq!(cache.total_height(), 100);
    }

    #[test]
    fn test_empty() {
        let cache = OffsetCache::new(0, &FixedHeight::default());
        assert!(cache.is_empty());
        assert_eq!(cache.total_height(), 0);
        assert_eq!(cache.row_height(0), 0);
    }
}
