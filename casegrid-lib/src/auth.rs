//! Bearer token seam.
//!
//! Sign-in and session refresh belong to the host shell. The grid only asks
//! for the current token before each request and lets 401 responses
//! propagate back as errors.

use async_trait::async_trait;

/// Supplies the bearer token attached to every request.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use casegrid_lib::auth::TokenProvider;
///
/// struct SessionTokens { store: SessionStore }
///
/// #[async_trait]
/// impl TokenProvider for SessionTokens {
///     async fn bearer_token(&self) -> Option<String> {
///         self.store.current_access_token().await
///     }
/// }
/// ```
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Returns the token to send, or `None` to send the request anonymously.
    async fn bearer_token(&self) -> Option<String>;
}

/// A token provider that always returns the same token.
#[derive(Debug, Clone)]
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn bearer_token(&self) -> Option<String> {
        Some(self.token.clone())
    }
}
