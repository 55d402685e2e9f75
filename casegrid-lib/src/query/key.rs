//! Cache keys.

use std::fmt;

use super::QuerySpec;

/// Opaque resource scope supplied by the host (e.g. `projects/7`).
///
/// Every query issued by a grid is prefixed by its scope, and bulk
/// mutations invalidate cached pages by scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Scope(String);

impl Scope {
    pub fn new(scope: impl Into<String>) -> Self {
        Self(scope.into().trim_matches('/').to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Scope {
    fn from(value: &str) -> Self {
        Scope::new(value)
    }
}

impl From<String> for Scope {
    fn from(value: String) -> Self {
        Scope::new(value)
    }
}

/// A query spec within a scope. This is the unit of caching and
/// request de-duplication.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub scope: Scope,
    pub query: QuerySpec,
}

impl CacheKey {
    pub fn new(scope: Scope, query: QuerySpec) -> Self {
        Self { scope, query }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}?{}", self.scope, self.query)
    }
}
