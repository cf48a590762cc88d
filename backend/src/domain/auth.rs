//! Authentication primitives: submitted credentials and the resolved caller.
//!
//! Inbound adapters build [`LoginCredentials`] from raw form or JSON input and
//! receive a [`CurrentUser`] for every request instead of consulting any
//! ambient "current user" state.

use std::fmt;

use zeroize::Zeroizing;

use super::User;

/// Field-level problems with submitted credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Username was missing or blank once trimmed.
    MissingUsername,
    /// Password was missing or empty.
    MissingPassword,
    /// Neither field was supplied.
    MissingBoth,
}

impl LoginValidationError {
    /// Names of the offending fields, in form order.
    pub fn fields(&self) -> &'static [&'static str] {
        match self {
            Self::MissingUsername => &["username"],
            Self::MissingPassword => &["password"],
            Self::MissingBoth => &["username", "password"],
        }
    }
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingUsername => write!(f, "username is required"),
            Self::MissingPassword => write!(f, "password is required"),
            Self::MissingBoth => write!(f, "username and password are required"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Validated login credentials used by authentication services.
///
/// ## Invariants
/// - `username` is trimmed and non-empty.
/// - `password` is non-empty and kept verbatim, whitespace included.
///
/// # Examples
/// ```
/// use rest_auth::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" admin ", "123456").unwrap();
/// assert_eq!(creds.username(), "admin");
/// assert_eq!(creds.password(), "123456");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw username/password inputs.
    pub fn try_from_parts(username: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalized = username.trim();
        match (normalized.is_empty(), password.is_empty()) {
            (true, true) => Err(LoginValidationError::MissingBoth),
            (true, false) => Err(LoginValidationError::MissingUsername),
            (false, true) => Err(LoginValidationError::MissingPassword),
            (false, false) => Ok(Self {
                username: normalized.to_owned(),
                password: Zeroizing::new(password.to_owned()),
            }),
        }
    }

    /// Username string suitable for user lookups.
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Identity of the caller for a single request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CurrentUser {
    /// No session and no token.
    #[default]
    Anonymous,
    /// Identity established by a session or an API token.
    Authenticated(User),
}

impl CurrentUser {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    /// The authenticated user, if any.
    pub fn user(&self) -> Option<&User> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated(user) => Some(user),
        }
    }
}

/// Renders the username, or `AnonymousUser` for visitors.
impl fmt::Display for CurrentUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Anonymous => f.write_str("AnonymousUser"),
            Self::Authenticated(user) => write!(f, "{}", user.username()),
        }
    }
}
