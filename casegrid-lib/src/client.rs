//! HTTP client for the test-management API

use std::sync::Arc;
use std::time::Duration;

use log::debug;
use log::warn;
use reqwest::Client;
use reqwest::Method;
use reqwest::header::ACCEPT;
use reqwest::header::CONTENT_TYPE;
use reqwest::header::HeaderValue;
use serde::de::DeserializeOwned;
use url::Url;

use crate::api::HttpSource;
use crate::auth::TokenProvider;
use crate::error::ApiError;
use crate::error::ConfigurationError;
use crate::model::Row;
use crate::retry::RetryConfig;

/// Client for the REST API backing the grid.
///
/// This client is cheap to clone (uses `Arc` internally) and can be shared
/// across threads safely.
///
/// # Example
///
/// ```ignore
/// use casegrid_lib::{GridClient, auth::StaticTokenProvider, model::TestCase};
///
/// let client = GridClient::builder()
///     .url("http://localhost:8000/api/v1")
///     .token_provider(StaticTokenProvider::new("my-token"))
///     .build()?;
///
/// let test_cases = client.resource::<TestCase>("testcases");
/// ```
#[derive(Clone)]
pub struct GridClient {
    inner: Arc<GridClientInner>,
}

struct GridClientInner {
    base_url: Url,
    token_provider: Option<Arc<dyn TokenProvider>>,
    http_client: Client,
    timeout: Option<Duration>,
    retry_config: RetryConfig,
}

impl GridClient {
    /// Creates a new builder for constructing a client.
    pub fn builder() -> GridClientBuilder<Missing> {
        GridClientBuilder::new()
    }

    /// Returns the base URL all resource paths are joined to.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    pub fn retry_config(&self) -> &RetryConfig {
        &self.inner.retry_config
    }

    /// A data source for `collection` under each scope.
    pub fn resource<T>(&self, collection: impl Into<String>) -> HttpSource<T>
    where
        T: Row + DeserializeOwned,
    {
        HttpSource::new(self.clone(), collection)
    }

    /// Joins path segments onto the base URL. Segments may contain `/`.
    pub(crate) fn url(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.inner.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ApiError::InvalidUrl(self.inner.base_url.to_string()))?;
            path.pop_if_empty();
            for segment in segments {
                path.extend(segment.split('/').filter(|s| !s.is_empty()));
            }
        }
        Ok(url)
    }

    /// Makes an HTTP request with retry logic.
    ///
    /// Non-success responses become [`ApiError::Http`] with the body's
    /// `detail`/`message` unwrapped. With `retry` set, retryable failures
    /// are retried with exponential backoff, honoring `Retry-After` on 429.
    pub(crate) async fn request(
        &self,
        method: Method,
        url: Url,
        body: Option<String>,
        retry: bool,
    ) -> Result<reqwest::Response, ApiError> {
        let retry_config = &self.inner.retry_config;
        let mut attempts = 0;

        loop {
            let (error, retry_after) = match self.send(method.clone(), url.clone(), body.clone()).await {
                Ok(response) if response.status().is_success() => return Ok(response),
                Ok(response) => {
                    let status = response.status().as_u16();
                    let retry_after = if status == 429 {
                        parse_retry_after(&response)
                    } else {
                        None
                    };
                    let body = response.text().await.unwrap_or_default();
                    (ApiError::from_body(status, &body), retry_after)
                }
                Err(e) => (e, None),
            };

            if !retry || !retry_config.should_retry(&error, attempts) {
                return Err(error);
            }

            let wait = retry_after.unwrap_or_else(|| retry_config.backoff(attempts));
            warn!("{} {} failed ({}), retrying in {:?}", method, url, error, wait);
            tokio::time::sleep(wait).await;
            attempts += 1;
        }
    }

    /// Inner request method without retry logic.
    async fn send(&self, method: Method, url: Url, body: Option<String>) -> Result<reqwest::Response, ApiError> {
        let mut request = self
            .inner
            .http_client
            .request(method, url)
            .header(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(provider) = &self.inner.token_provider {
            if let Some(token) = provider.bearer_token().await {
                request = request.bearer_auth(token);
            }
        }

        if let Some(timeout) = self.inner.timeout {
            request = request.timeout(timeout);
        }

        if let Some(body) = body {
            request = request
                .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
                .body(body);
        }

        request.send().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Timeout(self.inner.timeout.unwrap_or_default())
            } else {
                ApiError::Network(e)
            }
        })
    }
}

fn parse_retry_after(response: &reqwest::Response) -> Option<Duration> {
    response
        .headers()
        .get("Retry-After")?
        .to_str()
        .ok()?
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

// =============================================================================
// Typestate Builder
// =============================================================================

/// Marker type for missing required builder fields.
pub struct Missing;

/// Marker type for set builder fields.
pub struct Set<T>(T);

/// Builder for constructing a [`GridClient`].
///
/// Uses the typestate pattern to ensure the base URL is set at compile time.
///
/// # Example
///
/// ```ignore
/// let client = GridClient::builder()
///     .url("http://localhost:8000/api/v1")
///     .timeout(Duration::from_secs(30))
///     .retry(RetryConfig::no_retry())
///     .build()?;
/// ```
pub struct GridClientBuilder<U> {
    url: U,
    token_provider: Option<Arc<dyn TokenProvider>>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    http_client: Option<Client>,
    retry_config: RetryConfig,
}

impl GridClientBuilder<Missing> {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            url: Missing,
            token_provider: None,
            timeout: None,
            connect_timeout: None,
            http_client: None,
            retry_config: RetryConfig::default(),
        }
    }

    /// Sets the API base URL, e.g. `http://localhost:8000/api/v1`.
    pub fn url(self, url: impl Into<String>) -> GridClientBuilder<Set<String>> {
        GridClientBuilder {
            url: Set(url.into()),
            token_provider: self.token_provider,
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            http_client: self.http_client,
            retry_config: self.retry_config,
        }
    }
}

impl Default for GridClientBuilder<Missing> {
    fn default() -> Self {
        Self::new()
    }
}

impl<U> GridClientBuilder<U> {
    /// Sets the token provider. Requests are sent without credentials
    /// otherwise.
    pub fn token_provider<T: TokenProvider + 'static>(mut self, provider: T) -> Self {
        self.token_provider = Some(Arc::new(provider));
        self
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the connection timeout.
    ///
    /// This is applied when building the HTTP client.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sets a custom HTTP client.
    ///
    /// If not set, a default client will be created.
    pub fn http_client(mut self, client: Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Sets the retry policy for list requests.
    pub fn retry(mut self, config: RetryConfig) -> Self {
        self.retry_config = config;
        self
    }
}

impl GridClientBuilder<Set<String>> {
    /// Builds the [`GridClient`].
    pub fn build(self) -> Result<GridClient, ConfigurationError> {
        let base_url = Url::parse(&self.url.0)
            .map_err(|e| ConfigurationError::InvalidBaseUrl(format!("{}: {}", self.url.0, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ConfigurationError::InvalidBaseUrl(self.url.0));
        }

        let http_client = match self.http_client {
            Some(client) => client,
            None => {
                let mut builder = Client::builder();
                if let Some(timeout) = self.connect_timeout {
                    builder = builder.connect_timeout(timeout);
                }
                builder
                    .build()
                    .map_err(|e| ConfigurationError::HttpClient(e.to_string()))?
            }
        };

        debug!("client configured for {}", base_url);

        Ok(GridClient {
            inner: Arc::new(GridClientInner {
                base_url,
                token_provider: self.token_provider,
                http_client,
                timeout: self.timeout,
                retry_config: self.retry_config,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> GridClient {
        GridClient::builder().url(base).build().unwrap()
    }

    #[test]
    fn test_url_joins_segments() {
        let client = client("http://localhost:8000/api/v1/");
        let url = client.url(&["projects/7", "testcases", "bulk"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/v1/projects/7/testcases/bulk");
    }

    #[test]
    fn test_url_escapes_segments() {
        let client = client("http://localhost:8000/api");
        let url = client.url(&["team a", "cases"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/team%20a/cases");
    }

    #[test]
    fn test_invalid_base_url() {
        let result = GridClient::builder().url("not a url").build();
        assert!(matches!(result, Err(ConfigurationError::InvalidBaseUrl(_))));

        let result = GridClient::builder().url("mailto:qa@example.com").build();
        assert!(matches!(result, Err(ConfigurationError::InvalidBaseUrl(_))));
    }
}
