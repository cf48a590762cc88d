//! Driving port for login/authentication use-cases.
//!
//! Inbound adapters call this port to check credentials without knowing the
//! backing credential store, so view tests can substitute a double instead of
//! wiring persistence.

use async_trait::async_trait;

use crate::domain::{Error, LoginCredentials, User};

/// Domain use-case port for authentication.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and return the authenticated user.
    ///
    /// Unknown usernames, wrong passwords and inactive accounts all fail with
    /// the same [`crate::domain::ErrorCode::Unauthorized`] error.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<User, Error>;
}

/// Fixed authenticator accepting `admin` / `123456` as user 1.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureLoginService;

#[async_trait]
impl LoginService for FixtureLoginService {
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<User, Error> {
        if credentials.username() == "admin" && credentials.password() == "123456" {
            User::try_from_parts(1, "admin")
                .map(|user| user.with_staff(true))
                .map_err(|err| Error::internal(format!("invalid fixture user: {err}")))
        } else {
            Err(Error::unauthorized("invalid credentials"))
        }
    }
}
