//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers the JSON endpoints of the inbound HTTP layer and the
//! schema wrappers ([`ErrorSchema`], [`ErrorCodeSchema`]) that document the
//! domain error without coupling it to utoipa. The session views render HTML
//! and are not part of the document.
//!
//! The document is served by Swagger UI in debug builds and exported by
//! `cargo run --bin openapi-dump`.

use crate::inbound::http::api_root::ApiRoot;
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use crate::inbound::http::tokens::{TokenRequest, TokenResponse};
use crate::inbound::http::users::UserRepresentation;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Document the token header and the session cookie.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "TokenAuth",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                "Authorization",
                "`Token <key>` with a key issued by POST /token-auth/.",
            ))),
        );
        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "sessionid",
                "Session cookie issued by POST /login/.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "rest-auth API",
        description = "Read-only user API with session login and token authentication."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security((), ("TokenAuth" = []), ("SessionCookie" = [])),
    paths(
        crate::inbound::http::api_root::api_root,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::get_user,
        crate::inbound::http::tokens::obtain_token,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ApiRoot,
        UserRepresentation,
        TokenRequest,
        TokenResponse,
        ErrorSchema,
        ErrorCodeSchema
    )),
    tags(
        (name = "root", description = "API entry point"),
        (name = "users", description = "Read-only user directory"),
        (name = "auth", description = "Token exchange"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
