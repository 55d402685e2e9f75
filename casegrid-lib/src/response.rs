//! Response wrapper with cache status

use chrono::DateTime;
use chrono::Utc;

/// A fetched value together with where it came from.
///
/// The fetch coordinator hands out every page wrapped in this type; the grid
/// keeps the status of the page on screen for its render frame.
#[derive(Debug, Clone)]
pub struct Response<T> {
    data: T,
    /// Information about whether this response came from cache.
    pub cache: CacheStatus,
}

impl<T> Response<T> {
    /// Creates a response for freshly fetched data that is now cached.
    pub fn cache_miss(data: T, cached_at: DateTime<Utc>, stale_at: DateTime<Utc>) -> Self {
        Self {
            data,
            cache: CacheStatus::Miss { cached_at, stale_at },
        }
    }

    /// Creates a response served from cache within its staleness window.
    pub fn cache_hit(data: T, cached_at: DateTime<Utc>, stale_at: DateTime<Utc>) -> Self {
        Self {
            data,
            cache: CacheStatus::Hit { cached_at, stale_at },
        }
    }

    /// Creates a response served from cache past its staleness window.
    pub fn cache_stale(data: T, cached_at: DateTime<Utc>) -> Self {
        Self {
            data,
            cache: CacheStatus::Stale { cached_at },
        }
    }

    /// Returns a reference to the inner data.
    pub fn data(&self) -> &T {
        &self.data
    }

    /// Splits the response into its data and cache status.
    pub fn into_parts(self) -> (T, CacheStatus) {
        (self.data, self.cache)
    }
}

/// Cache status for a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheStatus {
    /// Cache was not involved.
    #[default]
    None,
    /// Freshly fetched and now cached.
    Miss {
        cached_at: DateTime<Utc>,
        stale_at: DateTime<Utc>,
    },
    /// Served from cache within the staleness window.
    Hit {
        cached_at: DateTime<Utc>,
        stale_at: DateTime<Utc>,
    },
    /// Served from cache past the staleness window or after invalidation.
    Stale { cached_at: DateTime<Utc> },
}

impl CacheStatus {
    /// Returns `true` if the data was served from the cache.
    pub fn is_cached(&self) -> bool {
        matches!(self, Self::Hit { .. } | Self::Stale { .. })
    }

    /// Returns `true` if the data should be revalidated.
    pub fn is_stale(&self) -> bool {
        matches!(self, Self::Stale { .. })
    }

    /// Returns when the data was fetched, if applicable.
    pub fn cached_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::None => None,
            Self::Miss { cached_at, .. } | Self::Hit { cached_at, .. } | Self::Stale { cached_at } => Some(*cached_at),
        }
    }
}
