//! Shared HTTP adapter state.
//!
//! Handlers receive this via `web::Data` so they depend only on domain ports
//! and stay testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{LoginService, TokenIssuer, UsersQuery};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub users: Arc<dyn UsersQuery>,
    pub tokens: Arc<dyn TokenIssuer>,
}

impl HttpState {
    /// Construct state from port implementations.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use rest_auth::domain::ports::{FixtureLoginService, FixtureUsersQuery};
    /// use rest_auth::domain::TokenService;
    /// use rest_auth::inbound::http::state::HttpState;
    /// use rest_auth::outbound::memory::{InMemoryTokenRepository, InMemoryUserRepository};
    ///
    /// let tokens = TokenService::new(
    ///     Arc::new(FixtureLoginService),
    ///     Arc::new(InMemoryUserRepository::new()),
    ///     Arc::new(InMemoryTokenRepository::new()),
    /// );
    /// let state = HttpState::new(
    ///     Arc::new(FixtureLoginService),
    ///     Arc::new(FixtureUsersQuery),
    ///     Arc::new(tokens),
    /// );
    /// let _users = state.users.clone();
    /// ```
    pub fn new(
        login: Arc<dyn LoginService>,
        users: Arc<dyn UsersQuery>,
        tokens: Arc<dyn TokenIssuer>,
    ) -> Self {
        Self {
            login,
            users,
            tokens,
        }
    }
}

