//! Builders wiring the domain services onto Diesel or in-memory stores.

use std::sync::Arc;

use rest_auth::domain::ports::{
    LoginService, TokenIssuer, TokenRepository, UserRepository, UsersQuery,
};
use rest_auth::domain::{
    AuthenticationService, BootstrapOutcome, Error, TokenService, UsersService,
    ensure_admin_user,
};
use rest_auth::inbound::http::state::HttpState;
use rest_auth::outbound::memory::{InMemoryTokenRepository, InMemoryUserRepository};
use rest_auth::outbound::persistence::{DbPool, DieselTokenRepository, DieselUserRepository};
use rest_auth::outbound::security::BcryptPasswordHasher;
use tracing::{info, warn};

use super::ServerConfig;

/// Driven adapters shared by every service.
pub(crate) struct Stores<U, T> {
    pub(crate) users: Arc<U>,
    pub(crate) tokens: Arc<T>,
    pub(crate) hasher: Arc<BcryptPasswordHasher>,
}

impl<U, T> Stores<U, T>
where
    U: UserRepository + 'static,
    T: TokenRepository + 'static,
{
    /// Create the configured administrator unless it already exists.
    pub(crate) async fn bootstrap_admin(&self, config: &ServerConfig) -> Result<(), Error> {
        let Some(admin) = &config.admin else {
            return Ok(());
        };
        match ensure_admin_user(
            self.users.as_ref(),
            self.hasher.as_ref(),
            &admin.username,
            &admin.password,
        )
        .await?
        {
            BootstrapOutcome::Created(user) => {
                info!(user_id = %user.id(), "bootstrap admin created");
            }
            BootstrapOutcome::AlreadyPresent(user) => {
                info!(user_id = %user.id(), "bootstrap admin already present");
            }
        }
        Ok(())
    }

    /// Assemble the driving ports over these stores.
    pub(crate) fn http_state(&self) -> HttpState {
        let login = Arc::new(AuthenticationService::new(
            self.users.clone(),
            self.hasher.clone(),
        ));
        let users: Arc<dyn UsersQuery> = Arc::new(UsersService::new(self.users.clone()));
        let tokens: Arc<dyn TokenIssuer> = Arc::new(TokenService::new(
            login.clone(),
            self.users.clone(),
            self.tokens.clone(),
        ));
        let login: Arc<dyn LoginService> = login;
        HttpState::new(login, users, tokens)
    }
}

fn hasher(config: &ServerConfig) -> Result<Arc<BcryptPasswordHasher>, Error> {
    BcryptPasswordHasher::with_cost(config.bcrypt_cost)
        .map(Arc::new)
        .map_err(|err| Error::invalid_request(format!("invalid bcrypt cost: {err}")))
}

pub(crate) fn diesel_stores(
    pool: &DbPool,
    config: &ServerConfig,
) -> Result<Stores<DieselUserRepository, DieselTokenRepository>, Error> {
    Ok(Stores {
        users: Arc::new(DieselUserRepository::new(pool.clone())),
        tokens: Arc::new(DieselTokenRepository::new(pool.clone())),
        hasher: hasher(config)?,
    })
}

pub(crate) fn memory_stores(
    config: &ServerConfig,
) -> Result<Stores<InMemoryUserRepository, InMemoryTokenRepository>, Error> {
    warn!("no database configured; users and tokens are kept in memory");
    Ok(Stores {
        users: Arc::new(InMemoryUserRepository::new()),
        tokens: Arc::new(InMemoryTokenRepository::new()),
        hasher: hasher(config)?,
    })
}

/// Build the HTTP state for `config`, bootstrapping the admin first.
pub(crate) async fn build_http_state(config: &ServerConfig) -> Result<HttpState, Error> {
    match &config.db_pool {
        Some(pool) => {
            let stores = diesel_stores(pool, config)?;
            stores.bootstrap_admin(config).await?;
            Ok(stores.http_state())
        }
        None => {
            let stores = memory_stores(config)?;
            stores.bootstrap_admin(config).await?;
            Ok(stores.http_state())
        }
    }
}
