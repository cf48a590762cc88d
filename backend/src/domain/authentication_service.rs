//! Credential checking against the user store.
//!
//! Implements [`LoginService`]. Every failure mode that depends on the
//! submitted credentials collapses into one `Unauthorized` error so callers
//! cannot tell unknown usernames from wrong passwords or disabled accounts.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::ports::{
    LoginService, PasswordHashError, PasswordHasher, UserPersistenceError, UserRepository,
};
use crate::domain::{Error, LoginCredentials, User};

const INVALID_CREDENTIALS: &str = "invalid credentials";

/// Map credential store failures onto domain errors.
pub(crate) fn map_user_persistence_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::DuplicateUsername { username } => {
            Error::internal(format!("unexpected duplicate username: {username}"))
        }
    }
}

pub(crate) fn map_password_hash_error(error: PasswordHashError) -> Error {
    Error::internal(error.to_string())
}

/// Username/password authenticator backed by a [`UserRepository`].
#[derive(Clone)]
pub struct AuthenticationService<R, H> {
    users: Arc<R>,
    hasher: Arc<H>,
}

impl<R, H> AuthenticationService<R, H> {
    pub fn new(users: Arc<R>, hasher: Arc<H>) -> Self {
        Self { users, hasher }
    }
}

#[async_trait]
impl<R, H> LoginService for AuthenticationService<R, H>
where
    R: UserRepository,
    H: PasswordHasher,
{
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<User, Error> {
        let stored = self
            .users
            .find_by_username(credentials.username())
            .await
            .map_err(map_user_persistence_error)?;

        let Some(stored) = stored else {
            // Spend the same hashing work an existing account would cost.
            self.hasher
                .hash(credentials.password())
                .await
                .map_err(map_password_hash_error)?;
            debug!("login rejected: unknown username");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };

        let matches = self
            .hasher
            .verify(credentials.password(), stored.password_hash())
            .await
            .map_err(map_password_hash_error)?;
        if !matches {
            debug!(user_id = %stored.user().id(), "login rejected: password mismatch");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }
        if !stored.user().is_active() {
            debug!(user_id = %stored.user().id(), "login rejected: inactive account");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }
        Ok(stored.into_user())
    }
}
