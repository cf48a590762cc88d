//! HTTP server configuration object and helpers.

use std::net::SocketAddr;

use rest_auth::inbound::http::pages::AuthViewConfig;
use rest_auth::inbound::http::session_config::SessionSettings;
use rest_auth::outbound::persistence::DbPool;
use rest_auth::settings::AdminAccount;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) session: SessionSettings,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) views: AuthViewConfig,
    pub(crate) bcrypt_cost: u32,
    pub(crate) admin: Option<AdminAccount>,
    pub(crate) db_pool: Option<DbPool>,
}

impl ServerConfig {
    #[must_use]
    pub fn new(session: SessionSettings, bind_addr: SocketAddr, views: AuthViewConfig) -> Self {
        Self {
            session,
            bind_addr,
            views,
            bcrypt_cost: rest_auth::settings::DEFAULT_BCRYPT_COST,
            admin: None,
            db_pool: None,
        }
    }

    /// Attach a database connection pool for the user and token stores.
    ///
    /// Without one the server keeps both stores in memory.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    #[must_use]
    pub fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost;
        self
    }

    /// Staff account to ensure before serving.
    #[must_use]
    pub fn with_admin(mut self, admin: Option<AdminAccount>) -> Self {
        self.admin = admin;
        self
    }
}
