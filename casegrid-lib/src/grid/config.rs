//! Grid configuration

use std::time::Duration;

use crate::cache::CacheConfig;
use crate::error::ConfigurationError;
use crate::query::ControllerOptions;

/// Configuration for a grid instance.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use casegrid_lib::grid::GridConfig;
///
/// let config = GridConfig::default()
///     .with_page_size(50)
///     .with_debounce(Duration::from_millis(150));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct GridConfig {
    /// Initial rows per page.
    ///
    /// Default: 20
    pub page_size: u32,

    /// Page sizes offered in the footer.
    ///
    /// Default: 10, 20, 50, 100
    pub page_size_options: Vec<u32>,

    /// Largest page size a user can request.
    ///
    /// Default: 100
    pub max_page_size: u32,

    /// Rows rendered beyond each edge of the viewport.
    ///
    /// Default: 5
    pub overscan: usize,

    /// Estimated row height in pixels.
    ///
    /// Default: 42
    pub row_height: u32,

    /// Initial viewport height in pixels.
    ///
    /// Default: 600
    pub viewport_height: u64,

    /// Quiet period before a search term is committed.
    ///
    /// Default: 300 ms
    pub debounce: Duration,

    /// Keep a multi-column sort instead of replacing it.
    ///
    /// Default: false
    pub multi_sort: bool,

    pub cache: CacheConfig,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            page_size: 20,
            page_size_options: vec![10, 20, 50, 100],
            max_page_size: 100,
            overscan: 5,
            row_height: 42,
            viewport_height: 600,
            debounce: Duration::from_millis(300),
            multi_sort: false,
            cache: CacheConfig::default(),
        }
    }
}

impl GridConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page_size(mut self, size: u32) -> Self {
        self.page_size = size;
        self
    }

    pub fn with_page_size_options(mut self, options: Vec<u32>) -> Self {
        self.page_size_options = options;
        self
    }

    pub fn with_max_page_size(mut self, max: u32) -> Self {
        self.max_page_size = max;
        self
    }

    pub fn with_overscan(mut self, overscan: usize) -> Self {
        self.overscan = overscan;
        self
    }

    pub fn with_row_height(mut self, height: u32) -> Self {
        self.row_height = height;
        self
    }

    pub fn with_viewport_height(mut self, height: u64) -> Self {
        self.viewport_height = height;
        self
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn with_multi_sort(mut self, enabled: bool) -> Self {
        self.multi_sort = enabled;
        self
    }

    pub fn with_cache(mut self, cache: CacheConfig) -> Self {
        self.cache = cache;
        self
    }

    /// Page sizes must lie in `1..=max_page_size`.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let max = self.max_page_size;
        let sizes = std::iter::once(&self.page_size).chain(&self.page_size_options);
        for &size in sizes {
            if size == 0 || size > max {
                return Err(ConfigurationError::PageSizeOutOfRange { size, max });
            }
        }
        Ok(())
    }

    pub(crate) fn controller_options(&self) -> ControllerOptions {
        ControllerOptions {
            debounce: self.debounce,
            multi_sort: self.multi_sort,
            max_page_size: self.max_page_size,
        }
    }
}
