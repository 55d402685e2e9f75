//! Result caching.
//!
//! Page results are cached per [`CacheKey`](crate::query::CacheKey). The
//! [`FetchCoordinator`] is the only writer; bulk mutations invalidate whole
//! scopes through it. Stale entries are still served while a background
//! fetch refreshes them.

mod config;
mod coordinator;
mod store;

pub use config::*;
pub use coordinator::*;
pub use store::*;
