//! Bulk actions over the selection.

use std::sync::Arc;

use log::debug;
use log::info;
use log::warn;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::api::DataSource;
use crate::cache::FetchCoordinator;
use crate::error::MutationError;
use crate::model::Row;
use crate::query::Scope;
use crate::selection::SelectionSet;

/// An action kind with its resolved parameters.
///
/// # Example
///
/// ```
/// use casegrid_lib::bulk::BulkAction;
///
/// let action = BulkAction::new("set_status").with_param("status", "blocked");
/// assert_eq!(action.params()["status"], "blocked");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct BulkAction {
    name: String,
    params: Value,
}

impl BulkAction {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Value::Object(Map::new()),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        if let Value::Object(params) = &mut self.params {
            params.insert(key.into(), value.into());
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &Value {
        &self.params
    }
}

/// Wire body of a bulk mutation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BulkRequest<Id> {
    /// Ascending.
    pub ids: Vec<Id>,
    pub action: String,
    pub params: Value,
}

/// What a bulk invocation did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkOutcome {
    /// The selection was empty; nothing was sent.
    Skipped,
    Applied {
        /// Rows the server reports as changed.
        updated_count: u64,
        /// Cached pages marked stale.
        invalidated: usize,
    },
}

/// Applies bulk actions to the current selection.
///
/// Every invocation issues at most one request carrying the full id list.
/// On success the scope's cached pages are invalidated and the selection is
/// cleared. On failure the selection is kept so the action can be retried.
pub struct BulkCoordinator<T: Row> {
    source: Arc<dyn DataSource<T>>,
    fetcher: FetchCoordinator<T>,
}

impl<T: Row> BulkCoordinator<T> {
    pub fn new(source: Arc<dyn DataSource<T>>, fetcher: FetchCoordinator<T>) -> Self {
        Self { source, fetcher }
    }

    pub async fn apply(
        &self,
        scope: &Scope,
        action: impl Into<BulkAction>,
        selection: &mut SelectionSet<T::Id>,
    ) -> Result<BulkOutcome, MutationError> {
        let action = action.into();
        if selection.is_empty() {
            debug!("skipping {} with empty selection", action.name());
            return Ok(BulkOutcome::Skipped);
        }

        let request = BulkRequest {
            ids: selection.ids(),
            action: action.name,
            params: action.params,
        };
        debug!("applying {} to {} rows in {}", request.action, request.ids.len(), scope);

        let updated_count = match self.source.bulk_mutate(scope, &request).await {
            Ok(count) => count,
            Err(e) => {
                warn!("{} failed for {} rows: {}", request.action, request.ids.len(), e);
                return Err(e);
            }
        };

        let invalidated = self.fetcher.invalidate_scope(scope);
        selection.clear();
        info!("{} updated {} rows in {}", request.action, updated_count, scope);

        Ok(BulkOutcome::Applied {
            updated_count,
            invalidated,
        })
    }
}
