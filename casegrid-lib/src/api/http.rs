//! REST data source.

use std::marker::PhantomData;

use async_trait::async_trait;
use log::debug;
use reqwest::Method;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use super::DataSource;
use crate::GridClient;
use crate::bulk::BulkRequest;
use crate::error::ApiError;
use crate::error::FetchError;
use crate::error::MutationError;
use crate::model::Row;
use crate::query::PageResult;
use crate::query::QuerySpec;
use crate::query::Scope;

/// Path segment appended to a collection for bulk mutations.
pub const BULK_SEGMENT: &str = "bulk";

/// A collection served at `{base}/{scope}/{collection}`.
///
/// - list: `GET {base}/{scope}/{collection}?page=..&size=..&sort=col:dir&<col>=<value>&search=<term>`
/// - bulk: `PUT {base}/{scope}/{collection}/bulk` with `{"ids", "action", "params"}`
pub struct HttpSource<T> {
    client: GridClient,
    collection: String,
    _row: PhantomData<fn() -> T>,
}

impl<T> Clone for HttpSource<T> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            collection: self.collection.clone(),
            _row: PhantomData,
        }
    }
}

impl<T> HttpSource<T> {
    pub(crate) fn new(client: GridClient, collection: impl Into<String>) -> Self {
        Self {
            client,
            collection: collection.into().trim_matches('/').to_string(),
            _row: PhantomData,
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }
}

/// List response body. Older endpoints name the row array after the
/// collection.
#[derive(Debug, Deserialize)]
struct ListBody<T> {
    #[serde(alias = "test_cases")]
    items: Vec<T>,
    total: u64,
}

#[derive(Debug, Deserialize)]
struct BulkBody {
    updated_count: u64,
}

#[async_trait]
impl<T> DataSource<T> for HttpSource<T>
where
    T: Row + DeserializeOwned,
{
    async fn list(&self, scope: &Scope, query: &QuerySpec) -> Result<PageResult<T>, FetchError> {
        let mut url = self.client.url(&[scope.as_str(), self.collection.as_str()])?;
        url.query_pairs_mut().extend_pairs(query.to_params());
        debug!("GET {}", url);

        let response = self.client.request(Method::GET, url, None, true).await?;
        let text = response.text().await.map_err(ApiError::from)?;
        let body: ListBody<T> = match serde_json::from_str(&text) {
            Ok(body) => body,
            Err(e) => return Err(ApiError::parse_with_body(e.to_string(), text).into()),
        };

        Ok(PageResult::new(body.items, body.total, query.clone()))
    }

    async fn bulk_mutate(&self, scope: &Scope, request: &BulkRequest<T::Id>) -> Result<u64, MutationError> {
        let url = self
            .client
            .url(&[scope.as_str(), self.collection.as_str(), BULK_SEGMENT])?;
        let body = serde_json::to_string(request).map_err(|e| MutationError::new(None, e.to_string()))?;
        debug!("PUT {} ({} ids)", url, request.ids.len());

        let response = self.client.request(Method::PUT, url, Some(body), false).await?;
        let text = response.text().await.map_err(ApiError::from)?;
        let body: BulkBody = match serde_json::from_str(&text) {
            Ok(body) => body,
            Err(e) => return Err(ApiError::parse_with_body(e.to_string(), text).into()),
        };

        Ok(body.updated_count)
    }
}
