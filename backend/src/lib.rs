//! Session login, token exchange and a read-only user API.
//!
//! The crate follows a ports-and-adapters layout: [`domain`] holds the types,
//! services and port traits; [`inbound::http`] adapts actix-web requests onto
//! the driving ports; [`outbound`] implements the driven ports over
//! PostgreSQL, in-memory maps and bcrypt.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;
#[cfg(feature = "test-support")]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
