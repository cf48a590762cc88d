//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`UserRepository`, `TokenRepository`, `PasswordHasher`) are
//! implemented by outbound adapters. Driving ports (`LoginService`,
//! `UsersQuery`, `TokenIssuer`) are implemented by domain services and called
//! by inbound adapters.

mod login_service;
mod password_hasher;
mod token_issuer;
mod token_repository;
mod user_repository;
mod users_query;

#[cfg(test)]
pub use login_service::MockLoginService;
pub use login_service::{FixtureLoginService, LoginService};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use token_issuer::MockTokenIssuer;
pub use token_issuer::TokenIssuer;
#[cfg(test)]
pub use token_repository::MockTokenRepository;
pub use token_repository::{TokenPersistenceError, TokenRepository};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{NewUser, StoredUser, UserPersistenceError, UserRepository};
#[cfg(test)]
pub use users_query::MockUsersQuery;
pub use users_query::{FixtureUsersQuery, UsersQuery};
