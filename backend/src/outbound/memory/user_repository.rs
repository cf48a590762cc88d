//! `RwLock`-guarded user table.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use crate::domain::ports::{NewUser, StoredUser, UserPersistenceError, UserRepository};
use crate::domain::{User, UserId};

#[derive(Debug, Default)]
struct UserTable {
    rows: BTreeMap<UserId, StoredUser>,
    last_id: i64,
}

/// In-memory [`UserRepository`] assigning ids sequentially from 1.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    table: RwLock<UserTable>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fully formed record, keeping its id.
    ///
    /// Later [`UserRepository::create`] calls continue after the highest id
    /// seen so far.
    pub fn insert(&self, stored: StoredUser) -> Result<(), UserPersistenceError> {
        let mut table = self.write()?;
        let username = stored.user().username().as_ref();
        if table
            .rows
            .values()
            .any(|row| row.user().username().as_ref() == username)
        {
            return Err(UserPersistenceError::duplicate_username(username));
        }
        let id = stored.user().id();
        table.last_id = table.last_id.max(id.get());
        table.rows.insert(id, stored);
        Ok(())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, UserTable>, UserPersistenceError> {
        self.table
            .read()
            .map_err(|_| UserPersistenceError::query("user table lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, UserTable>, UserPersistenceError> {
        self.table
            .write()
            .map_err(|_| UserPersistenceError::query("user table lock poisoned"))
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<StoredUser>, UserPersistenceError> {
        Ok(self
            .read()?
            .rows
            .values()
            .find(|row| row.user().username().as_ref() == username)
            .cloned())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.read()?.rows.get(&id).map(|row| row.user().clone()))
    }

    async fn list(&self) -> Result<Vec<User>, UserPersistenceError> {
        Ok(self
            .read()?
            .rows
            .values()
            .map(|row| row.user().clone())
            .collect())
    }

    async fn create(&self, new_user: &NewUser) -> Result<User, UserPersistenceError> {
        let mut table = self.write()?;
        if table
            .rows
            .values()
            .any(|row| row.user().username() == &new_user.username)
        {
            return Err(UserPersistenceError::duplicate_username(
                new_user.username.as_ref(),
            ));
        }
        let id = UserId::new(table.last_id + 1)
            .map_err(|err| UserPersistenceError::query(err.to_string()))?;
        let user = User::new(id, new_user.username.clone()).with_staff(new_user.is_staff);
        table.last_id = id.get();
        table.rows.insert(
            id,
            StoredUser::new(user.clone(), new_user.password_hash.clone()),
        );
        Ok(user)
    }
}
