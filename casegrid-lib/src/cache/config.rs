//! Cache configuration

use std::time::Duration;

/// Freshness settings for cached page results.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use casegrid_lib::cache::CacheConfig;
///
/// let config = CacheConfig::default()
///     .with_stale_time(Duration::from_secs(60))
///     .with_retention(Duration::from_secs(600));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// How long a result is served without revalidation.
    ///
    /// Default: 5 minutes
    pub stale_time: Duration,

    /// How long an entry is kept at all, fresh or stale.
    ///
    /// Default: 30 minutes
    pub retention: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            stale_time: Duration::from_secs(300), // 5 minutes
            retention: Duration::from_secs(1800), // 30 minutes
        }
    }
}

impl CacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stale_time(mut self, stale_time: Duration) -> Self {
        self.stale_time = stale_time;
        self
    }

    pub fn with_retention(mut self, retention: Duration) -> Self {
        self.retention = retention;
        self
    }

    /// Every cached result is immediately stale and revalidated on access.
    pub fn no_cache() -> Self {
        Self {
            stale_time: Duration::ZERO,
            retention: Duration::from_secs(1800),
        }
    }
}
