//! Fetch coordination: request de-duplication, caching and invalidation.

use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use futures::FutureExt;
use futures::future::BoxFuture;
use futures::future::Shared;
use log::debug;
use log::trace;

use crate::api::DataSource;
use crate::error::FetchError;
use crate::model::Row;
use crate::query::CacheKey;
use crate::query::PageResult;
use crate::query::Scope;
use crate::response::Response;

use super::CacheConfig;
use super::CachedPage;
use super::ResultCache;

type SharedFetch<T> = Shared<BoxFuture<'static, Result<CachedPage<T>, FetchError>>>;

/// Result of a cache lookup.
#[derive(Debug)]
pub enum Lookup<T> {
    /// Within the stale time; serve without fetching.
    Fresh(Response<Arc<PageResult<T>>>),
    /// Serve, then revalidate.
    Stale(Response<Arc<PageResult<T>>>),
    Miss,
}

/// Loads page results through a [`DataSource`], at most one request per key.
///
/// Concurrent fetches of the same key share a single pending request.
/// Cloning is cheap; clones share the cache and the in-flight table.
pub struct FetchCoordinator<T: Row> {
    inner: Arc<Inner<T>>,
}

struct Inner<T: Row> {
    source: Arc<dyn DataSource<T>>,
    cache: ResultCache<T>,
    in_flight: DashMap<CacheKey, (u64, SharedFetch<T>)>,
    next_fetch: AtomicU64,
    /// Bumped on every invalidation; results of fetches that started before
    /// the bump are stored already stale.
    generation: AtomicU64,
    config: CacheConfig,
}

impl<T: Row> Clone for FetchCoordinator<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Row> FetchCoordinator<T> {
    pub fn new(source: Arc<dyn DataSource<T>>, config: CacheConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                source,
                cache: ResultCache::new(),
                in_flight: DashMap::new(),
                next_fetch: AtomicU64::new(0),
                generation: AtomicU64::new(0),
                config,
            }),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.inner.config
    }

    pub fn cache(&self) -> &ResultCache<T> {
        &self.inner.cache
    }

    /// Classifies the cached entry for `key`.
    pub fn lookup(&self, key: &CacheKey) -> Lookup<T> {
        let stale_time = self.inner.config.stale_time;
        match self.inner.cache.get(key) {
            Some(cached) if cached.is_stale(stale_time) => {
                Lookup::Stale(Response::cache_stale(cached.page, cached.cached_at))
            }
            Some(cached) => {
                let stale_at = cached.stale_at(stale_time);
                Lookup::Fresh(Response::cache_hit(cached.page, cached.cached_at, stale_at))
            }
            None => Lookup::Miss,
        }
    }

    /// Whether a request for `key` is outstanding.
    pub fn is_in_flight(&self, key: &CacheKey) -> bool {
        self.inner.in_flight.contains_key(key)
    }

    /// Fetches `key` from the source, joining an outstanding request for
    /// the same key if there is one. The result is written to the cache.
    pub async fn fetch(&self, key: CacheKey) -> Result<Response<Arc<PageResult<T>>>, FetchError> {
        let cached = self.shared_fetch(key).await?;
        let stale_at = cached.stale_at(self.inner.config.stale_time);
        Ok(Response::cache_miss(cached.page, cached.cached_at, stale_at))
    }

    /// Marks every cached entry of `scope` stale and detaches outstanding
    /// requests for it, so the next access refetches.
    pub(crate) fn invalidate_scope(&self, scope: &Scope) -> usize {
        self.inner.generation.fetch_add(1, Ordering::SeqCst);
        self.inner.in_flight.retain(|key, _| &key.scope != scope);
        let hit = self.inner.cache.invalidate_scope(scope);
        debug!("invalidated {} cached pages in scope {}", hit, scope);
        hit
    }

    fn shared_fetch(&self, key: CacheKey) -> SharedFetch<T> {
        match self.inner.in_flight.entry(key.clone()) {
            Entry::Occupied(entry) => {
                trace!("joining in-flight fetch for {}", key);
                entry.get().1.clone()
            }
            Entry::Vacant(entry) => {
                let id = self.inner.next_fetch.fetch_add(1, Ordering::Relaxed);
                let generation = self.inner.generation.load(Ordering::SeqCst);
                let inner = Arc::clone(&self.inner);
                debug!("fetching {}", key);

                let fetch = async move {
                    let result = inner.source.list(&key.scope, &key.query).await;
                    inner.in_flight.remove_if(&key, |_, (fetch_id, _)| *fetch_id == id);
                    let page = Arc::new(result?);
                    let cached = if inner.generation.load(Ordering::SeqCst) == generation {
                        inner.cache.insert(key, page)
                    } else {
                        inner.cache.insert_invalidated(key, page)
                    };
                    inner.cache.gc(inner.config.retention);
                    Ok::<_, FetchError>(cached)
                }
                .boxed()
                .shared();

                entry.insert((id, fetch.clone()));
                fetch
            }
        }
    }
}
