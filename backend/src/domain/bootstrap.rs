//! Startup provisioning of the administrator account.

use tracing::info;

use crate::domain::authentication_service::{
    map_password_hash_error, map_user_persistence_error,
};
use crate::domain::ports::{NewUser, PasswordHasher, UserPersistenceError, UserRepository};
use crate::domain::{Error, User, Username};

/// What [`ensure_admin_user`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapOutcome {
    Created(User),
    AlreadyPresent(User),
}

/// Create the staff account `username` unless it already exists.
///
/// An existing account is left untouched, password included.
pub async fn ensure_admin_user<R, H>(
    users: &R,
    hasher: &H,
    username: &str,
    password: &str,
) -> Result<BootstrapOutcome, Error>
where
    R: UserRepository + ?Sized,
    H: PasswordHasher + ?Sized,
{
    let username = Username::new(username)
        .map_err(|err| Error::invalid_request(format!("invalid admin username: {err}")))?;
    if password.is_empty() {
        return Err(Error::invalid_request("admin password must not be empty"));
    }

    if let Some(existing) = users
        .find_by_username(username.as_ref())
        .await
        .map_err(map_user_persistence_error)?
    {
        return Ok(BootstrapOutcome::AlreadyPresent(existing.into_user()));
    }

    let password_hash = hasher
        .hash(password)
        .await
        .map_err(map_password_hash_error)?;
    let new_user = NewUser {
        username: username.clone(),
        password_hash,
        is_staff: true,
    };
    match users.create(&new_user).await {
        Ok(user) => {
            info!(user_id = %user.id(), username = %username, "admin user created");
            Ok(BootstrapOutcome::Created(user))
        }
        // Another worker won the race.
        Err(UserPersistenceError::DuplicateUsername { .. }) => users
            .find_by_username(username.as_ref())
            .await
            .map_err(map_user_persistence_error)?
            .map(|stored| BootstrapOutcome::AlreadyPresent(stored.into_user()))
            .ok_or_else(|| Error::internal("admin user vanished after duplicate insert")),
        Err(err) => Err(map_user_persistence_error(err)),
    }
}
