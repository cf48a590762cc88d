//! Application settings loaded via OrthoConfig.
//!
//! Values come from CLI flags, `REST_AUTH_*` environment variables and an
//! optional configuration file, in that order of precedence. Session cookie
//! settings are parsed separately from `SESSION_*` variables; see
//! [`crate::inbound::http::session_config`].

use std::fmt;
use std::net::SocketAddr;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Deserializer};

use crate::inbound::http::pages::{
    AuthViewConfig, DEFAULT_LOGIN_REDIRECT, LOGGED_OUT_TEMPLATE, LOGIN_TEMPLATE,
};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
/// Cost used when hashing passwords unless overridden.
pub const DEFAULT_BCRYPT_COST: u32 = 12;

/// Settings error surfaced at startup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid bind address {value:?}: {message}")]
    BindAddr { value: String, message: String },
    #[error("admin_username and admin_password must be set together")]
    PartialAdmin,
}

/// Scalar as read from a provider.
///
/// The environment provider types values that look like numbers or booleans,
/// so `REST_AUTH_ADMIN_PASSWORD=123456` arrives as an integer.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Unsigned(u64),
    Signed(i64),
    Float(f64),
    Flag(bool),
}

fn text_setting<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(deserializer)?.map(|value| match value {
        Scalar::Text(text) => text,
        Scalar::Unsigned(number) => number.to_string(),
        Scalar::Signed(number) => number.to_string(),
        Scalar::Float(number) => number.to_string(),
        Scalar::Flag(flag) => flag.to_string(),
    }))
}

/// Process-wide settings.
#[derive(Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "REST_AUTH")]
pub struct AppSettings {
    /// Socket address the HTTP server binds to.
    #[serde(default, deserialize_with = "text_setting")]
    pub bind_addr: Option<String>,
    /// PostgreSQL URL; in-memory stores are used when absent.
    #[serde(default, deserialize_with = "text_setting")]
    pub database_url: Option<String>,
    /// Landing page after a successful session login.
    #[serde(default, deserialize_with = "text_setting")]
    pub login_redirect_url: Option<String>,
    /// Template rendered by the login view.
    #[serde(default, deserialize_with = "text_setting")]
    pub login_template: Option<String>,
    /// Template rendered after logout.
    #[serde(default, deserialize_with = "text_setting")]
    pub logged_out_template: Option<String>,
    /// Staff account ensured at startup.
    #[serde(default, deserialize_with = "text_setting")]
    pub admin_username: Option<String>,
    #[serde(default, deserialize_with = "text_setting")]
    pub admin_password: Option<String>,
    /// bcrypt cost factor for new password hashes.
    #[ortho_config(default = 12)]
    pub bcrypt_cost: u32,
}

impl fmt::Debug for AppSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppSettings")
            .field("bind_addr", &self.bind_addr)
            .field("database_url", &self.database_url.as_ref().map(|_| "<set>"))
            .field("login_redirect_url", &self.login_redirect_url)
            .field("login_template", &self.login_template)
            .field("logged_out_template", &self.logged_out_template)
            .field("admin_username", &self.admin_username)
            .field("admin_password", &self.admin_password.as_ref().map(|_| "<redacted>"))
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish()
    }
}

/// Administrator credentials requested by configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct AdminAccount {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for AdminAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminAccount")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl AppSettings {
    /// Parse the bind address, falling back to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|err: std::net::AddrParseError| SettingsError::BindAddr {
            value: raw.to_owned(),
            message: err.to_string(),
        })
    }

    /// Database URL, ignoring blank values.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    pub fn bcrypt_cost(&self) -> u32 {
        self.bcrypt_cost
    }

    /// Template names and landing page for the session views.
    pub fn auth_view_config(&self) -> AuthViewConfig {
        AuthViewConfig {
            login_template: self
                .login_template
                .clone()
                .unwrap_or_else(|| LOGIN_TEMPLATE.to_owned()),
            logged_out_template: self
                .logged_out_template
                .clone()
                .unwrap_or_else(|| LOGGED_OUT_TEMPLATE.to_owned()),
            login_redirect: self
                .login_redirect_url
                .clone()
                .unwrap_or_else(|| DEFAULT_LOGIN_REDIRECT.to_owned()),
        }
    }

    /// The administrator to ensure at startup, when configured.
    pub fn admin_account(&self) -> Result<Option<AdminAccount>, SettingsError> {
        match (&self.admin_username, &self.admin_password) {
            (Some(username), Some(password)) => Ok(Some(AdminAccount {
                username: username.clone(),
                password: password.clone(),
            })),
            (None, None) => Ok(None),
            _ => Err(SettingsError::PartialAdmin),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 8] = [
        "REST_AUTH_BIND_ADDR",
        "REST_AUTH_DATABASE_URL",
        "REST_AUTH_LOGIN_REDIRECT_URL",
        "REST_AUTH_LOGIN_TEMPLATE",
        "REST_AUTH_LOGGED_OUT_TEMPLATE",
        "REST_AUTH_ADMIN_USERNAME",
        "REST_AUTH_ADMIN_PASSWORD",
        "REST_AUTH_BCRYPT_COST",
    ];

    fn load_from_empty_args() -> AppSettings {
        AppSettings::load_from_iter([OsString::from("rest-auth")]).expect("config should load")
    }

    fn cleared_except(overrides: &[(&str, &str)]) -> Vec<(&'static str, Option<String>)> {
        VARS.iter()
            .map(|&name| {
                let value = overrides
                    .iter()
                    .find(|(key, _)| *key == name)
                    .map(|(_, value)| (*value).to_owned());
                (name, value)
            })
            .collect()
    }

    #[rstest]
    fn defaults_apply_when_nothing_is_set() {
        let _guard = lock_env(cleared_except(&[]));

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr().expect("default addr"),
            "0.0.0.0:8080".parse::<SocketAddr>().expect("addr")
        );
        assert!(settings.database_url().is_none());
        assert_eq!(settings.bcrypt_cost(), DEFAULT_BCRYPT_COST);
        assert_eq!(settings.auth_view_config(), AuthViewConfig::default());
        assert_eq!(settings.admin_account().expect("no admin"), None);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env(cleared_except(&[
            ("REST_AUTH_BIND_ADDR", "127.0.0.1:9000"),
            ("REST_AUTH_DATABASE_URL", "postgres://localhost/rest_auth"),
            ("REST_AUTH_LOGIN_REDIRECT_URL", "/dashboard/"),
            ("REST_AUTH_LOGIN_TEMPLATE", "custom/login.html"),
            ("REST_AUTH_ADMIN_USERNAME", "admin"),
            ("REST_AUTH_ADMIN_PASSWORD", "123456"),
            ("REST_AUTH_BCRYPT_COST", "4"),
        ]));

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr().expect("addr"),
            "127.0.0.1:9000".parse::<SocketAddr>().expect("addr")
        );
        assert_eq!(
            settings.database_url(),
            Some("postgres://localhost/rest_auth")
        );
        assert_eq!(settings.bcrypt_cost(), 4);
        let views = settings.auth_view_config();
        assert_eq!(views.login_redirect, "/dashboard/");
        assert_eq!(views.login_template, "custom/login.html");
        assert_eq!(views.logged_out_template, LOGGED_OUT_TEMPLATE);
        let admin = settings
            .admin_account()
            .expect("complete admin")
            .expect("admin present");
        assert_eq!(admin.username, "admin");
        assert_eq!(admin.password, "123456");
    }

    #[rstest]
    fn numeric_looking_values_are_read_as_text() {
        let _guard = lock_env(cleared_except(&[
            ("REST_AUTH_ADMIN_USERNAME", "1001"),
            ("REST_AUTH_ADMIN_PASSWORD", "123456"),
            ("REST_AUTH_LOGIN_TEMPLATE", "true"),
        ]));

        let settings = load_from_empty_args();
        let admin = settings
            .admin_account()
            .expect("complete admin")
            .expect("admin present");
        assert_eq!(admin.username, "1001");
        assert_eq!(admin.password, "123456");
        assert_eq!(settings.auth_view_config().login_template, "true");
    }

    #[rstest]
    fn invalid_bind_address_is_reported() {
        let _guard = lock_env(cleared_except(&[("REST_AUTH_BIND_ADDR", "not-an-addr")]));

        let err = load_from_empty_args()
            .bind_addr()
            .expect_err("invalid addr");
        assert!(matches!(err, SettingsError::BindAddr { .. }));
    }

    #[rstest]
    fn half_configured_admin_is_rejected() {
        let _guard = lock_env(cleared_except(&[("REST_AUTH_ADMIN_USERNAME", "admin")]));

        assert_eq!(
            load_from_empty_args().admin_account(),
            Err(SettingsError::PartialAdmin)
        );
    }

    #[rstest]
    fn debug_output_redacts_secrets() {
        let _guard = lock_env(cleared_except(&[
            ("REST_AUTH_DATABASE_URL", "postgres://user:secret@db/rest_auth"),
            ("REST_AUTH_ADMIN_USERNAME", "admin"),
            ("REST_AUTH_ADMIN_PASSWORD", "hunter2"),
        ]));

        let rendered = format!("{:?}", load_from_empty_args());
        assert!(!rendered.contains("secret"));
        assert!(!rendered.contains("hunter2"));
    }
}
