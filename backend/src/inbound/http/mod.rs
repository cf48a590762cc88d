//! HTTP inbound adapter exposing the session views and the REST endpoints.
//!
//! Handlers receive the caller through [`current_user::RequestUser`] and talk
//! to the domain only through the ports held by [`state::HttpState`].

pub mod api_root;
pub mod auth_views;
pub mod current_user;
pub mod error;
pub mod health;
pub mod negotiation;
pub mod pages;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod tokens;
pub mod users;

pub use error::ApiResult;

use actix_web::web;

/// Register every API and session route.
///
/// Callers provide `web::Data<HttpState>` and `web::Data<AuthViews>` and wrap
/// the app in the session middleware.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.configure(api_root::configure)
        .configure(users::configure)
        .configure(tokens::configure)
        .configure(auth_views::configure)
        .configure(tokens::configure_aliases)
        .configure(auth_views::configure_aliases);
}
