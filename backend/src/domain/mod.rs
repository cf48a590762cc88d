//! Domain primitives, services and ports.
//!
//! Purpose: define strongly typed entities shared by the HTTP and persistence
//! adapters, and the services implementing the driving ports. Types are
//! immutable once validated and document their invariants in Rustdoc.
//!
//! Public surface:
//! - Error / ErrorCode: API error payload and stable error identifier.
//! - User / UserId / Username: account identity.
//! - LoginCredentials / CurrentUser: authentication inputs and outcome.
//! - AuthToken: opaque API token.
//! - permissions: composable request permission predicates.

pub mod auth;
pub mod authentication_service;
pub mod bootstrap;
pub mod error;
pub mod permissions;
pub mod ports;
pub mod token;
pub mod token_service;
pub mod trace_id;
pub mod user;
pub mod users_service;

pub use self::auth::{CurrentUser, LoginCredentials, LoginValidationError};
pub use self::authentication_service::AuthenticationService;
pub use self::bootstrap::{BootstrapOutcome, ensure_admin_user};
pub use self::error::{Error, ErrorCode};
pub use self::token::{AuthToken, MalformedToken, TOKEN_KEY_LEN};
pub use self::token_service::{TokenService, UNABLE_TO_LOG_IN};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{USERNAME_MAX, User, UserId, UserValidationError, Username};
pub use self::users_service::UsersService;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use rest_auth::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
