//! Data source trait.

use async_trait::async_trait;

use crate::bulk::BulkRequest;
use crate::error::FetchError;
use crate::error::MutationError;
use crate::model::Row;
use crate::query::PageResult;
use crate::query::QuerySpec;
use crate::query::Scope;

/// A paginated, sortable, filterable collection of rows.
///
/// Sorting, filtering and searching happen on the source; the grid never
/// reorders rows it receives.
#[async_trait]
pub trait DataSource<T: Row>: Send + Sync {
    /// Loads one page for `query`.
    async fn list(&self, scope: &Scope, query: &QuerySpec) -> Result<PageResult<T>, FetchError>;

    /// Applies one batched mutation. Returns the number of rows changed.
    async fn bulk_mutate(&self, scope: &Scope, request: &BulkRequest<T::Id>) -> Result<u64, MutationError>;
}
