//! API token exchange and token authentication.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::domain::authentication_service::map_user_persistence_error;
use crate::domain::ports::{
    LoginService, TokenIssuer, TokenPersistenceError, TokenRepository, UserRepository,
};
use crate::domain::{AuthToken, Error, ErrorCode, LoginCredentials, User};

/// Message returned when the exchanged credentials are rejected.
pub const UNABLE_TO_LOG_IN: &str = "Unable to log in with provided credentials.";

fn map_token_persistence_error(error: TokenPersistenceError) -> Error {
    match error {
        TokenPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("token repository unavailable: {message}"))
        }
        TokenPersistenceError::Query { message } => {
            Error::internal(format!("token repository error: {message}"))
        }
    }
}

/// Implements [`TokenIssuer`] by delegating credential checks to a
/// [`LoginService`].
#[derive(Clone)]
pub struct TokenService<L, U, T> {
    login: Arc<L>,
    users: Arc<U>,
    tokens: Arc<T>,
}

impl<L, U, T> TokenService<L, U, T> {
    pub fn new(login: Arc<L>, users: Arc<U>, tokens: Arc<T>) -> Self {
        Self {
            login,
            users,
            tokens,
        }
    }
}

#[async_trait]
impl<L, U, T> TokenIssuer for TokenService<L, U, T>
where
    L: LoginService,
    U: UserRepository,
    T: TokenRepository,
{
    async fn obtain_token(&self, credentials: &LoginCredentials) -> Result<AuthToken, Error> {
        let user = match self.login.authenticate(credentials).await {
            Ok(user) => user,
            Err(err) if err.code() == ErrorCode::Unauthorized => {
                return Err(Error::invalid_request(UNABLE_TO_LOG_IN).with_details(
                    serde_json::json!({ "non_field_errors": [UNABLE_TO_LOG_IN] }),
                ));
            }
            Err(err) => return Err(err),
        };

        let token = self
            .tokens
            .get_or_create(user.id(), &AuthToken::generate())
            .await
            .map_err(map_token_persistence_error)?;
        info!(user_id = %user.id(), "api token issued");
        Ok(token)
    }

    async fn authenticate_token(&self, token: &AuthToken) -> Result<User, Error> {
        let user_id = self
            .tokens
            .find_user_id(token)
            .await
            .map_err(map_token_persistence_error)?
            .ok_or_else(|| Error::unauthorized("Invalid token."))?;

        match self
            .users
            .find_by_id(user_id)
            .await
            .map_err(map_user_persistence_error)?
        {
            Some(user) if user.is_active() => Ok(user),
            _ => Err(Error::unauthorized("User inactive or deleted.")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserId;
    use crate::domain::ports::{MockLoginService, MockTokenRepository, MockUserRepository};
    use rstest::rstest;

    const KEY: &str = "9944b09199c62bcf9418ad846dd0e4bbdfc6ee4b";

    fn admin() -> User {
        User::try_from_parts(1, "admin").expect("valid user")
    }

    fn creds() -> LoginCredentials {
        LoginCredentials::try_from_parts("admin", "123456").expect("valid credentials")
    }

    fn service(
        login: MockLoginService,
        users: MockUserRepository,
        tokens: MockTokenRepository,
    ) -> TokenService<MockLoginService, MockUserRepository, MockTokenRepository> {
        TokenService::new(Arc::new(login), Arc::new(users), Arc::new(tokens))
    }

    #[rstest]
    #[tokio::test]
    async fn obtain_token_returns_the_stored_token() {
        let mut login = MockLoginService::new();
        login.expect_authenticate().return_once(|_| Ok(admin()));
        let mut tokens = MockTokenRepository::new();
        tokens
            .expect_get_or_create()
            .withf(|user_id, _| user_id.get() == 1)
            .return_once(|_, _| Ok(AuthToken::parse(KEY).expect("valid key")));

        let token = service(login, MockUserRepository::new(), tokens)
            .obtain_token(&creds())
            .await
            .expect("token");
        assert_eq!(token.as_str(), KEY);
    }

    #[rstest]
    #[tokio::test]
    async fn rejected_credentials_become_a_validation_error() {
        let mut login = MockLoginService::new();
        login
            .expect_authenticate()
            .return_once(|_| Err(Error::unauthorized("invalid credentials")));
        let mut tokens = MockTokenRepository::new();
        tokens.expect_get_or_create().never();

        let err = service(login, MockUserRepository::new(), tokens)
            .obtain_token(&creds())
            .await
            .expect_err("rejected");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(err.message(), UNABLE_TO_LOG_IN);
    }

    #[rstest]
    #[case::unknown_token(None, None)]
    #[case::deleted_owner(Some(1), None)]
    #[case::inactive_owner(Some(1), Some(false))]
    #[tokio::test]
    async fn authenticate_token_rejects_unusable_tokens(
        #[case] owner: Option<i64>,
        #[case] owner_active: Option<bool>,
    ) {
        let mut tokens = MockTokenRepository::new();
        tokens
            .expect_find_user_id()
            .return_once(move |_| Ok(owner.map(|id| UserId::new(id).expect("valid id"))));
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .returning(move |_| Ok(owner_active.map(|active| admin().with_active(active))));

        let token = AuthToken::parse(KEY).expect("valid key");
        let err = service(MockLoginService::new(), users, tokens)
            .authenticate_token(&token)
            .await
            .expect_err("rejected");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }

    #[rstest]
    #[tokio::test]
    async fn authenticate_token_resolves_active_owner() {
        let mut tokens = MockTokenRepository::new();
        tokens
            .expect_find_user_id()
            .return_once(|_| Ok(Some(UserId::new(1).expect("valid id"))));
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().return_once(|_| Ok(Some(admin())));

        let token = AuthToken::parse(KEY).expect("valid key");
        let user = service(MockLoginService::new(), users, tokens)
            .authenticate_token(&token)
            .await
            .expect("resolved");
        assert_eq!(user.username().as_ref(), "admin");
    }
}
