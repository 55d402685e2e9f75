//! Grid-level error taxonomy.
//!
//! Fetch and mutation errors are recoverable and are exposed as grid state.
//! Configuration errors are fatal and surface from the builders.

use super::ApiError;

fn status_label(status: &Option<u16>) -> String {
    match status {
        Some(status) => format!("HTTP {status}"),
        None => "transport".to_string(),
    }
}

/// A list query failed on the network or on the server.
///
/// Cloneable so that every caller sharing a de-duplicated request receives
/// the same failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("fetch failed ({}): {message}", status_label(.status))]
pub struct FetchError {
    /// HTTP status, or `None` for transport failures.
    pub status: Option<u16>,
    /// Human-readable message.
    pub message: String,
}

impl FetchError {
    pub fn new(status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Returns `true` for 401/403 responses.
    ///
    /// These are not handled by the grid; the host shell decides what to do
    /// (typically a redirect to sign-in).
    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status, Some(401 | 403))
    }
}

impl From<ApiError> for FetchError {
    fn from(err: ApiError) -> Self {
        Self::new(err.status_code(), err.message())
    }
}

/// A bulk mutation failed. The selection is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("bulk action failed ({}): {message}", status_label(.status))]
pub struct MutationError {
    /// HTTP status, or `None` for transport failures.
    pub status: Option<u16>,
    /// Human-readable message.
    pub message: String,
}

impl MutationError {
    pub fn new(status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl From<ApiError> for MutationError {
    fn from(err: ApiError) -> Self {
        Self::new(err.status_code(), err.message())
    }
}

/// Invalid setup, detected when a grid or client is built.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("grid has no columns")]
    NoColumns,

    #[error("duplicate column id '{0}'")]
    DuplicateColumn(String),

    #[error("column '{0}' has zero width")]
    ZeroWidthColumn(String),

    #[error("column id '{0}' collides with a reserved query parameter")]
    ReservedColumnId(String),

    #[error("page size {size} is outside 1..={max}")]
    PageSizeOutOfRange { size: u32, max: u32 },

    #[error("sort references unknown column '{0}'")]
    UnknownSortColumn(String),

    #[error("column '{0}' is not sortable")]
    UnsortableColumn(String),

    #[error("filter references unknown or unfilterable column '{0}'")]
    UnfilterableColumn(String),

    #[error("no data source configured")]
    MissingSource,

    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_display() {
        let err = FetchError::new(Some(500), "boom");
        assert_eq!(err.to_string(), "fetch failed (HTTP 500): boom");

        let err = FetchError::new(None, "connection refused");
        assert_eq!(err.to_string(), "fetch failed (transport): connection refused");
    }

    #[test]
    fn test_unauthorized() {
        assert!(FetchError::new(Some(401), "").is_unauthorized());
        assert!(FetchError::new(Some(403), "").is_unauthorized());
        assert!(!FetchError::new(Some(404), "").is_unauthorized());
        assert!(!FetchError::new(None, "").is_unauthorized());
    }

    #[test]
    fn test_from_api_error_keeps_status() {
        let err: MutationError = ApiError::from_body(409, r#"{"detail":"conflict"}"#).into();
        assert_eq!(err.status, Some(409));
        assert_eq!(err.message, "conflict");
    }
}
