//! Driving port for the read-only user resource.
//!
//! HTTP handlers fetch user-visible data through this port without importing
//! persistence concerns.

use async_trait::async_trait;

use crate::domain::{Error, User, UserId};

/// Domain use-case port for listing and fetching users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersQuery: Send + Sync {
    /// Every user, ordered by ascending id.
    async fn list_users(&self) -> Result<Vec<User>, Error>;

    /// One user, or a `NotFound` error.
    async fn find_user(&self, id: UserId) -> Result<User, Error>;
}

/// Fixed users query exposing the single `admin` account.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureUsersQuery;

impl FixtureUsersQuery {
    fn fixture() -> Result<User, Error> {
        User::try_from_parts(1, "admin")
            .map(|user| user.with_staff(true))
            .map_err(|err| Error::internal(format!("invalid fixture user: {err}")))
    }
}

#[async_trait]
impl UsersQuery for FixtureUsersQuery {
    async fn list_users(&self) -> Result<Vec<User>, Error> {
        Ok(vec![Self::fixture()?])
    }

    async fn find_user(&self, id: UserId) -> Result<User, Error> {
        let user = Self::fixture()?;
        if user.id() == id {
            Ok(user)
        } else {
            Err(Error::not_found("Not found."))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn fixture_users_query_lists_admin() {
        let users = FixtureUsersQuery.list_users().await.expect("users list");
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].username().as_ref(), "admin");
    }

    #[rstest]
    #[tokio::test]
    async fn fixture_users_query_reports_missing_ids() {
        let id = UserId::new(2).expect("valid id");
        let err = FixtureUsersQuery.find_user(id).await.expect_err("missing");
        assert_eq!(err.code(), ErrorCode::NotFound);
        assert_eq!(err.message(), "Not found.");
    }
}
