//! Session login and logout views.
//!
//! ```text
//! GET  /login/   credential form
//! POST /login/   302 on success, form with errors otherwise
//! GET  /logout/  purge session, logged-out page
//! POST /logout/  same as GET
//! ```

use actix_web::http::header::{ContentType, LOCATION};
use actix_web::{HttpResponse, web};
use serde::Deserialize;
use tracing::info;

use crate::domain::{CurrentUser, Error, ErrorCode, LoginCredentials};

use super::current_user::session_user;
use super::pages::{AuthViews, LoginForm, PageContext};
use super::session::SessionContext;
use super::state::HttpState;

const LOGIN_TITLE: &str = "Log in";
const LOGGED_OUT_TITLE: &str = "Logged out";
const FIELD_REQUIRED: &str = "This field is required.";
const INVALID_LOGIN: &str = "Please enter a correct username and password. \
Note that both fields may be case-sensitive.";

/// `next` carried in the query string of the login page.
#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    #[serde(default)]
    next: Option<String>,
}

/// Fields posted by the login form.
///
/// Decoded from the raw body so that an empty or non-urlencoded submission
/// reaches the view as missing fields instead of failing extraction.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct LoginFormData {
    username: String,
    password: String,
    next: Option<String>,
}

impl LoginFormData {
    fn parse(body: &[u8]) -> Self {
        let mut data = Self::default();
        for (key, value) in url::form_urlencoded::parse(body) {
            match key.as_ref() {
                "username" => data.username = value.into_owned(),
                "password" => data.password = value.into_owned(),
                "next" => data.next = Some(value.into_owned()),
                _ => {}
            }
        }
        data
    }
}

/// Accept only local absolute paths as post-login targets.
fn is_safe_redirect(target: &str) -> bool {
    target.starts_with('/')
        && !target.starts_with("//")
        && !target.starts_with("/\\")
        && !target.chars().any(char::is_control)
}

fn html(body: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(body)
}

fn render(views: &AuthViews, template: &str, context: &PageContext) -> Result<HttpResponse, Error> {
    views.renderer.render(template, context).map(html)
}

async fn current_user_label(
    state: &HttpState,
    session: &SessionContext,
) -> Result<String, Error> {
    let user = session_user(state, session)
        .await?
        .map_or(CurrentUser::Anonymous, CurrentUser::Authenticated);
    Ok(user.to_string())
}

fn login_context(user: String, form: LoginForm, next: Option<String>) -> PageContext {
    PageContext {
        title: LOGIN_TITLE.to_owned(),
        user,
        form: Some(form),
        next: next.filter(|target| !target.is_empty()),
    }
}

/// Render the credential form.
pub async fn login_page(
    state: web::Data<HttpState>,
    views: web::Data<AuthViews>,
    session: SessionContext,
    query: web::Query<NextQuery>,
) -> Result<HttpResponse, Error> {
    let user = current_user_label(&state, &session).await?;
    let context = login_context(user, LoginForm::unbound(), query.into_inner().next);
    render(&views, &views.config.login_template, &context)
}

/// Validate submitted credentials and bind the user to the session.
pub async fn login_submit(
    state: web::Data<HttpState>,
    views: web::Data<AuthViews>,
    session: SessionContext,
    body: web::Bytes,
) -> Result<HttpResponse, Error> {
    let LoginFormData {
        username,
        password,
        next,
    } = LoginFormData::parse(&body);
    let mut bound = LoginForm {
        username: username.trim().to_owned(),
        ..LoginForm::unbound()
    };

    match LoginCredentials::try_from_parts(&username, &password) {
        Ok(credentials) => match state.login.authenticate(&credentials).await {
            Ok(user) => {
                session.renew();
                session.persist_user(user.id())?;
                info!(user_id = %user.id(), "session login");
                let target = next
                    .filter(|target| is_safe_redirect(target))
                    .unwrap_or_else(|| views.config.login_redirect.clone());
                return Ok(HttpResponse::Found()
                    .insert_header((LOCATION, target))
                    .finish());
            }
            Err(err) if err.code() == ErrorCode::Unauthorized => {
                bound.non_field_errors.push(INVALID_LOGIN.to_owned());
            }
            Err(err) => return Err(err),
        },
        Err(missing) => {
            for &field in missing.fields() {
                bound
                    .field_errors
                    .insert(field, vec![FIELD_REQUIRED.to_owned()]);
            }
        }
    }

    let user = current_user_label(&state, &session).await?;
    render(
        &views,
        &views.config.login_template,
        &login_context(user, bound, next),
    )
}

/// Forget the session user and render the logged-out page.
pub async fn logout(
    views: web::Data<AuthViews>,
    session: SessionContext,
) -> Result<HttpResponse, Error> {
    if session.user_id()?.is_some() {
        info!("session logout");
    }
    session.purge();
    let context = PageContext {
        title: LOGGED_OUT_TITLE.to_owned(),
        user: CurrentUser::Anonymous.to_string(),
        form: None,
        next: None,
    };
    render(&views, &views.config.logged_out_template, &context)
}

fn login_resource(path: &str) -> actix_web::Resource {
    web::resource(path)
        .route(web::get().to(login_page))
        .route(web::post().to(login_submit))
}

fn logout_resource(path: &str) -> actix_web::Resource {
    web::resource(path)
        .route(web::get().to(logout))
        .route(web::post().to(logout))
}

/// Register the login and logout routes on a scope or app.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(login_resource("/login/").name("login"))
        .service(logout_resource("/logout/").name("logout"));
}

/// Unnamed copies under `/api-auth/` for clients of the older layout.
pub fn configure_aliases(cfg: &mut web::ServiceConfig) {
    cfg.service(login_resource("/api-auth/login/"))
        .service(logout_resource("/api-auth/logout/"));
}
