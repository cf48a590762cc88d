//! Driving port for API token exchange and token authentication.

use async_trait::async_trait;

use crate::domain::{AuthToken, Error, LoginCredentials, User};

/// Domain use-case port for opaque API tokens.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenIssuer: Send + Sync {
    /// Exchange valid credentials for the user's token, creating it on first
    /// use.
    async fn obtain_token(&self, credentials: &LoginCredentials) -> Result<AuthToken, Error>;

    /// Resolve a presented token to its active owner.
    ///
    /// Unknown tokens and tokens owned by inactive users fail with
    /// `Unauthorized`.
    async fn authenticate_token(&self, token: &AuthToken) -> Result<User, Error>;
}
