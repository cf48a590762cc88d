//! Read-only user queries backed by the credential store.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::authentication_service::map_user_persistence_error;
use crate::domain::ports::{UserRepository, UsersQuery};
use crate::domain::{Error, User, UserId};

/// Implements [`UsersQuery`] over a [`UserRepository`].
#[derive(Clone)]
pub struct UsersService<R> {
    users: Arc<R>,
}

impl<R> UsersService<R> {
    pub fn new(users: Arc<R>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl<R> UsersQuery for UsersService<R>
where
    R: UserRepository,
{
    async fn list_users(&self) -> Result<Vec<User>, Error> {
        let mut users = self.users.list().await.map_err(map_user_persistence_error)?;
        // Adapters already order by id; keep the contract independent of them.
        users.sort_by_key(User::id);
        Ok(users)
    }

    async fn find_user(&self, id: UserId) -> Result<User, Error> {
        self.users
            .find_by_id(id)
            .await
            .map_err(map_user_persistence_error)?
            .ok_or_else(|| Error::not_found("Not found."))
    }
}
