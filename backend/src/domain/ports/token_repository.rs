//! Port abstraction for API token storage.

use async_trait::async_trait;

use crate::domain::{AuthToken, UserId};

/// Persistence errors raised by token repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenPersistenceError {
    /// Repository connection could not be established.
    #[error("token repository connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("token repository query failed: {message}")]
    Query { message: String },
}

impl TokenPersistenceError {
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Storage for the single token each user may hold.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Return the user's existing token, or store `candidate` and return it.
    async fn get_or_create(
        &self,
        user_id: UserId,
        candidate: &AuthToken,
    ) -> Result<AuthToken, TokenPersistenceError>;

    /// Owner of `token`, if it was ever issued.
    async fn find_user_id(&self, token: &AuthToken)
    -> Result<Option<UserId>, TokenPersistenceError>;
}
