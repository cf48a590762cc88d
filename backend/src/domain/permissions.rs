//! Request-level permission predicates.
//!
//! A [`Permission`] inspects the verb and the resolved caller of a request and
//! answers yes or no. Predicates compose with [`Permission::and`] and
//! [`Permission::or`], so resource policies are built rather than inherited.
//!
//! # Examples
//! ```
//! use rest_auth::domain::permissions::{AccessRequest, IsAuthenticated, Permission, ReadOnly};
//! use rest_auth::domain::CurrentUser;
//!
//! let policy = ReadOnly.or(IsAuthenticated);
//! let anonymous = CurrentUser::Anonymous;
//! assert!(policy.has_permission(&AccessRequest::new("GET", &anonymous)));
//! assert!(!policy.has_permission(&AccessRequest::new("DELETE", &anonymous)));
//! ```

use super::CurrentUser;

/// Verbs that never mutate state.
pub const SAFE_METHODS: [&str; 3] = ["GET", "HEAD", "OPTIONS"];

/// Verbs understood as writes against a resource.
pub const WRITE_METHODS: [&str; 4] = ["POST", "PUT", "PATCH", "DELETE"];

/// Whether `method` is a safe, read-only verb.
#[must_use]
pub fn is_read_only(method: &str) -> bool {
    SAFE_METHODS.contains(&method)
}

/// Whether `method` is a recognised write verb.
#[must_use]
pub fn is_write(method: &str) -> bool {
    WRITE_METHODS.contains(&method)
}

/// Inputs a permission predicate may inspect.
#[derive(Debug, Clone, Copy)]
pub struct AccessRequest<'a> {
    method: &'a str,
    user: &'a CurrentUser,
}

impl<'a> AccessRequest<'a> {
    pub fn new(method: &'a str, user: &'a CurrentUser) -> Self {
        Self { method, user }
    }

    pub fn method(&self) -> &str {
        self.method
    }

    pub fn user(&self) -> &CurrentUser {
        self.user
    }
}

/// A predicate evaluated once per request.
pub trait Permission: Send + Sync {
    fn has_permission(&self, request: &AccessRequest<'_>) -> bool;

    /// Both predicates must allow the request.
    fn and<P>(self, other: P) -> And<Self, P>
    where
        Self: Sized,
        P: Permission,
    {
        And(self, other)
    }

    /// Either predicate may allow the request.
    fn or<P>(self, other: P) -> Or<Self, P>
    where
        Self: Sized,
        P: Permission,
    {
        Or(self, other)
    }
}

impl<F> Permission for F
where
    F: Fn(&AccessRequest<'_>) -> bool + Send + Sync,
{
    fn has_permission(&self, request: &AccessRequest<'_>) -> bool {
        self(request)
    }
}

/// Allows every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAny;

impl Permission for AllowAny {
    fn has_permission(&self, _request: &AccessRequest<'_>) -> bool {
        true
    }
}

/// Allows safe verbs for every caller, regardless of identity.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadOnly;

impl Permission for ReadOnly {
    fn has_permission(&self, request: &AccessRequest<'_>) -> bool {
        is_read_only(request.method())
    }
}

/// Allows only authenticated callers.
#[derive(Debug, Clone, Copy, Default)]
pub struct IsAuthenticated;

impl Permission for IsAuthenticated {
    fn has_permission(&self, request: &AccessRequest<'_>) -> bool {
        request.user().is_authenticated()
    }
}

/// Conjunction produced by [`Permission::and`].
#[derive(Debug, Clone, Copy)]
pub struct And<A, B>(A, B);

impl<A: Permission, B: Permission> Permission for And<A, B> {
    fn has_permission(&self, request: &AccessRequest<'_>) -> bool {
        self.0.has_permission(request) && self.1.has_permission(request)
    }
}

/// Disjunction produced by [`Permission::or`].
#[derive(Debug, Clone, Copy)]
pub struct Or<A, B>(A, B);

impl<A: Permission, B: Permission> Permission for Or<A, B> {
    fn has_permission(&self, request: &AccessRequest<'_>) -> bool {
        self.0.has_permission(request) || self.1.has_permission(request)
    }
}
