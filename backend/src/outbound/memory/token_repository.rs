//! `RwLock`-guarded token table.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::ports::{TokenPersistenceError, TokenRepository};
use crate::domain::{AuthToken, UserId};

/// In-memory [`TokenRepository`] holding at most one token per user.
#[derive(Debug, Default)]
pub struct InMemoryTokenRepository {
    by_user: RwLock<HashMap<UserId, AuthToken>>,
}

impl InMemoryTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> TokenPersistenceError {
    TokenPersistenceError::query("token table lock poisoned")
}

#[async_trait]
impl TokenRepository for InMemoryTokenRepository {
    async fn get_or_create(
        &self,
        user_id: UserId,
        candidate: &AuthToken,
    ) -> Result<AuthToken, TokenPersistenceError> {
        let mut by_user = self.by_user.write().map_err(poisoned)?;
        Ok(by_user
            .entry(user_id)
            .or_insert_with(|| candidate.clone())
            .clone())
    }

    async fn find_user_id(
        &self,
        token: &AuthToken,
    ) -> Result<Option<UserId>, TokenPersistenceError> {
        let by_user = self.by_user.read().map_err(poisoned)?;
        Ok(by_user
            .iter()
            .find_map(|(user_id, stored)| (stored == token).then_some(*user_id)))
    }
}
