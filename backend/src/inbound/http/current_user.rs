//! Explicit caller identity for HTTP handlers.
//!
//! [`RequestUser`] resolves the caller once per request: a session bound by
//! the login view wins, then an `Authorization: Token <key>` header, and
//! otherwise the caller is anonymous. A token header that is present but
//! malformed or unknown fails the request with 401 before the handler runs.

use actix_session::SessionExt;
use actix_web::http::header::{AUTHORIZATION, HeaderValue};
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;
use tracing::debug;

use crate::domain::{AuthToken, CurrentUser, Error, ErrorCode, User};

use super::session::SessionContext;
use super::state::HttpState;

const TOKEN_KEYWORD: &[u8] = b"token";
const NO_CREDENTIALS: &str = "Invalid token header. No credentials provided.";
const CONTAINS_SPACES: &str = "Invalid token header. Token string should not contain spaces.";
const INVALID_CHARACTERS: &str =
    "Invalid token header. Token string should not contain invalid characters.";
const INVALID_TOKEN: &str = "Invalid token.";

/// The resolved caller of the current request.
#[derive(Debug, Clone)]
pub struct RequestUser(pub CurrentUser);

impl RequestUser {
    pub fn into_inner(self) -> CurrentUser {
        self.0
    }
}

/// Extract the token from an `Authorization` header.
///
/// Headers using another scheme are ignored so other authenticators may
/// claim them.
fn token_from_header(value: &HeaderValue) -> Result<Option<AuthToken>, Error> {
    let mut parts = value
        .as_bytes()
        .split(u8::is_ascii_whitespace)
        .filter(|part| !part.is_empty());

    match parts.next() {
        Some(keyword) if keyword.eq_ignore_ascii_case(TOKEN_KEYWORD) => {}
        _ => return Ok(None),
    }
    let key = parts.next().ok_or_else(|| Error::unauthorized(NO_CREDENTIALS))?;
    if parts.next().is_some() {
        return Err(Error::unauthorized(CONTAINS_SPACES));
    }
    let key = std::str::from_utf8(key).map_err(|_| Error::unauthorized(INVALID_CHARACTERS))?;
    AuthToken::parse(key)
        .map(Some)
        .map_err(|_| Error::unauthorized(INVALID_TOKEN))
}

/// The active user bound to the session, if any.
pub(crate) async fn session_user(
    state: &HttpState,
    session: &SessionContext,
) -> Result<Option<User>, Error> {
    let Some(id) = session.user_id()? else {
        return Ok(None);
    };
    match state.users.find_user(id).await {
        Ok(user) if user.is_active() => Ok(Some(user)),
        Ok(_) => {
            debug!(user_id = %id, "session user is inactive");
            Ok(None)
        }
        Err(err) if err.code() == ErrorCode::NotFound => {
            debug!(user_id = %id, "session user no longer exists");
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

impl FromRequest for RequestUser {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        let session = SessionContext::new(req.get_session());
        let header = req.headers().get(AUTHORIZATION).cloned();

        Box::pin(async move {
            let state = state.ok_or_else(|| Error::internal("HTTP state is not configured"))?;

            if let Some(user) = session_user(&state, &session).await? {
                return Ok(Self(CurrentUser::Authenticated(user)));
            }

            let token = match header.as_ref() {
                Some(value) => token_from_header(value)?,
                None => None,
            };
            match token {
                Some(token) => {
                    let user = state.tokens.authenticate_token(&token).await?;
                    Ok(Self(CurrentUser::Authenticated(user)))
                }
                None => Ok(Self(CurrentUser::Anonymous)),
            }
        })
    }
}
