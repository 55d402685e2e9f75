//! In-memory result store backed by DashMap

use std::sync::Arc;
use std::time::Duration;

use chrono::DateTime;
use chrono::Utc;
use dashmap::DashMap;
use tokio::time::Instant;

use crate::query::CacheKey;
use crate::query::PageResult;
use crate::query::Scope;

/// A cached page with the metadata needed to judge its freshness.
#[derive(Debug)]
pub struct CachedPage<T> {
    pub page: Arc<PageResult<T>>,
    /// Wall-clock time of the fetch, for display.
    pub cached_at: DateTime<Utc>,
    fetched_at: Instant,
    invalidated: bool,
}

impl<T> Clone for CachedPage<T> {
    fn clone(&self) -> Self {
        Self {
            page: Arc::clone(&self.page),
            cached_at: self.cached_at,
            fetched_at: self.fetched_at,
            invalidated: self.invalidated,
        }
    }
}

impl<T> CachedPage<T> {
    fn new(page: Arc<PageResult<T>>) -> Self {
        Self {
            page,
            cached_at: Utc::now(),
            fetched_at: Instant::now(),
            invalidated: false,
        }
    }

    /// Invalidated entries are stale regardless of age.
    pub fn is_stale(&self, stale_time: Duration) -> bool {
        self.invalidated || self.fetched_at.elapsed() >= stale_time
    }

    pub fn is_invalidated(&self) -> bool {
        self.invalidated
    }

    /// Wall-clock time at which the entry turns stale.
    pub fn stale_at(&self, stale_time: Duration) -> DateTime<Utc> {
        self.cached_at + chrono::Duration::from_std(stale_time).unwrap_or(chrono::Duration::zero())
    }

    fn is_expired(&self, retention: Duration) -> bool {
        self.fetched_at.elapsed() >= retention
    }
}

/// Page results keyed by scope and query.
///
/// Writes go through [`FetchCoordinator`](super::FetchCoordinator) only.
#[derive(Debug)]
pub struct ResultCache<T> {
    store: DashMap<CacheKey, CachedPage<T>>,
}

impl<T> Default for ResultCache<T> {
    fn default() -> Self {
        Self {
            store: DashMap::new(),
        }
    }
}

impl<T> ResultCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &CacheKey) -> Option<CachedPage<T>> {
        self.store.get(key).map(|entry| entry.value().clone())
    }

    pub(crate) fn insert(&self, key: CacheKey, page: Arc<PageResult<T>>) -> CachedPage<T> {
        let cached = CachedPage::new(page);
        self.store.insert(key, cached.clone());
        cached
    }

    pub(crate) fn insert_invalidated(&self, key: CacheKey, page: Arc<PageResult<T>>) -> CachedPage<T> {
        let mut cached = CachedPage::new(page);
        cached.invalidated = true;
        self.store.insert(key, cached.clone());
        cached
    }

    /// Marks every entry of `scope` stale. Returns the number of entries hit.
    pub(crate) fn invalidate_scope(&self, scope: &Scope) -> usize {
        let mut hit = 0;
        for mut entry in self.store.iter_mut() {
            if &entry.key().scope == scope {
                entry.value_mut().invalidated = true;
                hit += 1;
            }
        }
        hit
    }

    /// Drops entries older than `retention`. Returns the number removed.
    pub(crate) fn gc(&self, retention: Duration) -> usize {
        let mut removed = 0;
        self.store.retain(|_, value| {
            if value.is_expired(retention) {
                removed += 1;
                false
            } else {
                true
            }
        });
        removed
    }

    /// Returns the number of entries in the cache (including stale ones).
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::QuerySpec;

    fn key(scope: &str, page: u32) -> CacheKey {
        CacheKey::new(scope.into(), QuerySpec::new(20).with_page(page))
    }

    fn page(page: u32) -> Arc<PageResult<u32>> {
        Arc::new(PageResult::new(vec![page], 57, QuerySpec::new(20).with_page(page)))
    }

    #[tokio::test(start_paused = true)]
    async fn test_entries_turn_stale() {
        let cache = ResultCache::new();
        cache.insert(key("projects/1", 1), page(1));

        let stale_time = Duration::from_secs(300);
        assert!(!cache.get(&key("projects/1", 1)).unwrap().is_stale(stale_time));

        tokio::time::advance(Duration::from_secs(301)).await;
        assert!(cache.get(&key("projects/1", 1)).unwrap().is_stale(stale_time));
    }

    #[test]
    fn test_invalidate_scope_only_hits_scope() {
        let cache = ResultCache::new();
        cache.insert(key("projects/1", 1), page(1));
        cache.insert(key("projects/1", 2), page(2));
        cache.insert(key("projects/2", 1), page(1));

        assert_eq!(cache.invalidate_scope(&"projects/1".into()), 2);

        let hour = Duration::from_secs(3600);
        assert!(cache.get(&key("projects/1", 1)).unwrap().is_stale(hour));
        assert!(cache.get(&key("projects/1", 2)).unwrap().is_invalidated());
        assert!(!cache.get(&key("projects/2", 1)).unwrap().is_stale(hour));
    }

    #[tokio::test(start_paused = true)]
    async fn test_gc_drops_expired() {
        let cache = ResultCache::new();
        cache.insert(key("projects/1", 1), page(1));
        tokio::time::advance(Duration::from_secs(60)).await;
        cache.insert(key("projects/1", 2), page(2));
        tokio::time::advance(Duration::from_secs(60)).await;

        assert_eq!(cache.gc(Duration::from_secs(90)), 1);
        assert_eq!(cache.len(), 1);
        assert!(cache.get(&key("projects/1", 2)).is_some());
    }
}
