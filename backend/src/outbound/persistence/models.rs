//! Internal Diesel row structs.
//!
//! Rows never leave the persistence module; repositories convert them into
//! domain types at the boundary.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use super::schema::{auth_tokens, users};
use crate::domain::ports::StoredUser;
use crate::domain::{User, UserId, UserValidationError};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: i64,
    pub username: String,
    pub password: String,
    pub is_staff: bool,
    pub is_active: bool,
    #[expect(dead_code, reason = "selected for parity with the table; unused by the API")]
    pub date_joined: DateTime<Utc>,
}

impl UserRow {
    pub(crate) fn into_user(self) -> Result<User, UserValidationError> {
        self.into_stored().map(StoredUser::into_user)
    }

    pub(crate) fn into_stored(self) -> Result<StoredUser, UserValidationError> {
        let user = User::try_from_parts(self.id, &self.username)?
            .with_staff(self.is_staff)
            .with_active(self.is_active);
        Ok(StoredUser::new(user, self.password))
    }
}

/// Insertable struct for creating user records; `id` and `date_joined` are
/// filled by the database.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub username: &'a str,
    pub password: &'a str,
    pub is_staff: bool,
    pub is_active: bool,
}

/// Insertable struct for issuing a token.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = auth_tokens)]
pub(crate) struct NewTokenRow<'a> {
    pub key: &'a str,
    pub user_id: i64,
}

/// Convert a stored foreign key back into a domain id.
pub(crate) fn user_id_from_row(raw: i64) -> Result<UserId, UserValidationError> {
    UserId::new(raw)
}
