//! Test utilities shared by unit and integration tests.
//!
//! Compiled only with the `test-support` feature. [`TestHarness`] wires the
//! real domain services over in-memory stores and a fixed session key, so an
//! app rebuilt from the same harness decrypts cookies issued by an earlier
//! instance.

use std::sync::Arc;

use actix_web::cookie::time::Duration;
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};

use crate::Trace;
use crate::domain::ports::{PasswordHasher, StoredUser};
use crate::domain::{
    AuthenticationService, Error, TokenService, User, UserId, Username, UsersService,
    ensure_admin_user,
};
use crate::inbound::http::health::{HealthState, live, ready};
use crate::inbound::http::pages::{AuthViewConfig, AuthViews, RecordingPageRenderer};
use crate::inbound::http::session_config::{SESSION_TTL_DEFAULT_SECONDS, SessionSettings};
use crate::inbound::http::state::HttpState;
use crate::outbound::memory::{InMemoryTokenRepository, InMemoryUserRepository};
use crate::outbound::security::{BcryptPasswordHasher, MIN_COST};

/// Username of the seeded staff account.
pub const ADMIN_USERNAME: &str = "admin";
/// Password of the seeded staff account.
pub const ADMIN_PASSWORD: &str = "123456";

/// Domain services over in-memory stores plus a fixed session key.
pub struct TestHarness {
    users: Arc<InMemoryUserRepository>,
    tokens: Arc<InMemoryTokenRepository>,
    hasher: Arc<BcryptPasswordHasher>,
    renderer: Arc<RecordingPageRenderer>,
    config: AuthViewConfig,
    key: Key,
}

impl TestHarness {
    /// Harness with no users.
    ///
    /// # Errors
    ///
    /// Fails only if the bcrypt cost is rejected.
    pub fn empty() -> Result<Self, Error> {
        let hasher = BcryptPasswordHasher::with_cost(MIN_COST)
            .map_err(|err| Error::internal(err.to_string()))?;
        Ok(Self {
            users: Arc::new(InMemoryUserRepository::new()),
            tokens: Arc::new(InMemoryTokenRepository::new()),
            hasher: Arc::new(hasher),
            renderer: Arc::new(RecordingPageRenderer::default()),
            config: AuthViewConfig::default(),
            key: Key::generate(),
        })
    }

    /// Harness holding the staff user `admin` / `123456` with id 1.
    ///
    /// # Errors
    ///
    /// Propagates failures from the bootstrap service.
    pub async fn seeded() -> Result<Self, Error> {
        let harness = Self::empty()?;
        ensure_admin_user(
            harness.users.as_ref(),
            harness.hasher.as_ref(),
            ADMIN_USERNAME,
            ADMIN_PASSWORD,
        )
        .await?;
        Ok(harness)
    }

    /// Replace the view configuration used by subsequently built apps.
    #[must_use]
    pub fn with_view_config(mut self, config: AuthViewConfig) -> Self {
        self.config = config;
        self
    }

    /// Store a user with an explicit id and activity flag.
    ///
    /// # Errors
    ///
    /// Fails on an invalid id or username, or a duplicate username.
    pub async fn add_user(
        &self,
        id: i64,
        username: &str,
        password: &str,
        is_active: bool,
    ) -> Result<User, Error> {
        let id = UserId::new(id).map_err(|err| Error::invalid_request(err.to_string()))?;
        let username =
            Username::new(username).map_err(|err| Error::invalid_request(err.to_string()))?;
        let hash = self
            .hasher
            .hash(password)
            .await
            .map_err(|err| Error::internal(err.to_string()))?;
        let user = User::new(id, username).with_active(is_active);
        self.users
            .insert(StoredUser::new(user.clone(), hash))
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        Ok(user)
    }

    pub fn renderer(&self) -> &RecordingPageRenderer {
        &self.renderer
    }

    /// Cookie settings sharing the harness key; `Secure` is off for plain
    /// HTTP test requests.
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            key: self.key.clone(),
            cookie_secure: false,
            same_site: SameSite::Lax,
            ttl: Duration::seconds(SESSION_TTL_DEFAULT_SECONDS),
        }
    }

    /// Ports backed by the harness stores.
    pub fn http_state(&self) -> HttpState {
        let login = Arc::new(AuthenticationService::new(
            self.users.clone(),
            self.hasher.clone(),
        ));
        HttpState::new(
            login.clone(),
            Arc::new(UsersService::new(self.users.clone())),
            Arc::new(TokenService::new(
                login,
                self.users.clone(),
                self.tokens.clone(),
            )),
        )
    }

    /// Fully wired application, middleware included.
    pub fn app(
        &self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        > + use<>,
    > {
        let health = HealthState::new();
        health.mark_ready();
        App::new()
            .app_data(web::Data::new(self.http_state()))
            .app_data(web::Data::new(AuthViews::new(
                self.config.clone(),
                self.renderer.clone(),
            )))
            .app_data(web::Data::new(health))
            .wrap(self.session_settings().middleware())
            .wrap(Trace)
            .configure(crate::inbound::http::configure)
            .service(ready)
            .service(live)
    }
}
