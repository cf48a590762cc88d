//! PostgreSQL-backed [`TokenRepository`].

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use super::diesel_error_mapping::{DieselFailure, classify_diesel_error};
use super::models::{NewTokenRow, user_id_from_row};
use super::pool::{DbPool, PoolError};
use super::schema::auth_tokens;
use crate::domain::ports::{TokenPersistenceError, TokenRepository};
use crate::domain::{AuthToken, UserId};

/// Diesel adapter over the `auth_tokens` table.
#[derive(Clone)]
pub struct DieselTokenRepository {
    pool: DbPool,
}

impl DieselTokenRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> TokenPersistenceError {
    TokenPersistenceError::connection(error.into_message())
}

fn map_diesel_error(error: diesel::result::Error, operation: &str) -> TokenPersistenceError {
    match classify_diesel_error(&error, operation) {
        DieselFailure::Connection(message) => TokenPersistenceError::connection(message),
        DieselFailure::UniqueViolation => TokenPersistenceError::query("token key collision"),
        DieselFailure::Query(message) => TokenPersistenceError::query(message),
    }
}

#[async_trait]
impl TokenRepository for DieselTokenRepository {
    async fn get_or_create(
        &self,
        user_id: UserId,
        candidate: &AuthToken,
    ) -> Result<AuthToken, TokenPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewTokenRow {
            key: candidate.as_str(),
            user_id: user_id.get(),
        };
        diesel::insert_into(auth_tokens::table)
            .values(&row)
            .on_conflict(auth_tokens::user_id)
            .do_nothing()
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "insert token"))?;

        let key: String = auth_tokens::table
            .filter(auth_tokens::user_id.eq(user_id.get()))
            .select(auth_tokens::key)
            .first(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "read token"))?;
        AuthToken::parse(&key)
            .map_err(|err| TokenPersistenceError::query(format!("stored token is invalid: {err}")))
    }

    async fn find_user_id(
        &self,
        token: &AuthToken,
    ) -> Result<Option<UserId>, TokenPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let owner: Option<i64> = auth_tokens::table
            .find(token.as_str())
            .select(auth_tokens::user_id)
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, "find token owner"))?;
        owner
            .map(user_id_from_row)
            .transpose()
            .map_err(|err| TokenPersistenceError::query(format!("stored owner is invalid: {err}")))
    }
}
