//! Token exchange endpoint.
//!
//! ```text
//! POST /token-auth/ {"username":"admin","password":"123456"}
//! 200 {"token":"9944b09199c62bcf9418ad846dd0e4bbdfc6ee4b"}
//! ```
//!
//! Credentials may be posted as JSON or as an urlencoded form.

use std::collections::BTreeMap;

use actix_web::http::header::CONTENT_TYPE;
use actix_web::{HttpRequest, HttpResponse, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;
use utoipa::ToSchema;

use crate::domain::{Error, LoginCredentials};

use super::ApiResult;
use super::schemas::ErrorSchema;
use super::state::HttpState;

/// Route name of the exchange endpoint.
pub const TOKEN_AUTH: &str = "token-auth";

const FIELD_REQUIRED: &str = "This field is required.";

/// Credentials posted to the exchange endpoint.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct TokenRequest {
    #[serde(default)]
    #[schema(example = "admin")]
    pub username: String,
    #[serde(default)]
    #[schema(example = "123456")]
    pub password: String,
}

/// The caller's token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct TokenResponse {
    #[schema(example = "9944b09199c62bcf9418ad846dd0e4bbdfc6ee4b")]
    pub token: String,
}

fn is_json(req: &HttpRequest) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .is_some_and(|essence| {
            let essence = essence.trim();
            essence.eq_ignore_ascii_case("application/json")
                || essence.to_ascii_lowercase().ends_with("+json")
        })
}

/// Decode the body as JSON or as an urlencoded form.
fn parse_body(req: &HttpRequest, body: &[u8]) -> Result<TokenRequest, Error> {
    if is_json(req) {
        return serde_json::from_slice(body)
            .map_err(|err| Error::invalid_request(format!("JSON parse error - {err}")));
    }
    let mut request = TokenRequest::default();
    for (key, value) in url::form_urlencoded::parse(body) {
        match key.as_ref() {
            "username" => request.username = value.into_owned(),
            "password" => request.password = value.into_owned(),
            _ => {}
        }
    }
    Ok(request)
}

fn missing_fields(fields: &[&str]) -> Error {
    let details: BTreeMap<&str, [&str; 1]> =
        fields.iter().map(|&field| (field, [FIELD_REQUIRED])).collect();
    Error::invalid_request(format!("missing required fields: {}", fields.join(", ")))
        .with_details(json!(details))
}

/// Exchange credentials for the caller's token.
#[utoipa::path(
    post,
    path = "/token-auth/",
    request_body(
        content = TokenRequest,
        content_type = "application/json",
        description = "Username and password; an urlencoded form is also accepted"
    ),
    responses(
        (status = 200, description = "Token for the credentials", body = TokenResponse),
        (status = 400, description = "Missing fields or rejected credentials", body = ErrorSchema),
        (status = 503, description = "Credential store unavailable", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "obtainToken"
)]
pub async fn obtain_token(
    req: HttpRequest,
    state: web::Data<HttpState>,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    let TokenRequest { username, password } = parse_body(&req, &body)?;
    let credentials = LoginCredentials::try_from_parts(&username, &password)
        .map_err(|missing| missing_fields(missing.fields()))?;
    let token = state.tokens.obtain_token(&credentials).await?;
    debug!(username = credentials.username(), "token issued");
    Ok(HttpResponse::Ok().json(TokenResponse {
        token: token.to_string(),
    }))
}

async fn reject_method(req: HttpRequest) -> ApiResult<HttpResponse> {
    Err(Error::method_not_allowed(req.method().as_str()))
}

fn exchange_resource(path: &str) -> actix_web::Resource {
    web::resource(path)
        .route(web::post().to(obtain_token))
        .default_service(web::to(reject_method))
}

/// Register the exchange endpoint.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(exchange_resource("/token-auth/").name(TOKEN_AUTH));
}

/// Unnamed copy at `/api-token-auth/` for clients of the older layout.
pub fn configure_aliases(cfg: &mut web::ServiceConfig) {
    cfg.service(exchange_resource("/api-token-auth/"));
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::ports::{FixtureLoginService, FixtureUsersQuery, MockTokenIssuer};
    use crate::domain::{AuthToken, UNABLE_TO_LOG_IN};
    use actix_web::http::StatusCode;
    use actix_web::http::header::ContentType;
    use actix_web::{App, test as actix_test};
    use rstest::rstest;
    use serde_json::Value;

    const KEY: &str = "9944b09199c62bcf9418ad846dd0e4bbdfc6ee4b";

    fn issuing_admin_token() -> MockTokenIssuer {
        let mut tokens = MockTokenIssuer::new();
        tokens.expect_obtain_token().returning(|creds| {
            if creds.username() == "admin" && creds.password() == "123456" {
                Ok(AuthToken::parse(KEY).expect("token"))
            } else {
                Err(Error::invalid_request(UNABLE_TO_LOG_IN)
                    .with_details(json!({ "non_field_errors": [UNABLE_TO_LOG_IN] })))
            }
        });
        tokens
    }

    fn state(tokens: MockTokenIssuer) -> web::Data<HttpState> {
        web::Data::new(HttpState::new(
            Arc::new(FixtureLoginService),
            Arc::new(FixtureUsersQuery),
            Arc::new(tokens),
        ))
    }

    fn form(pairs: &[(&str, &str)]) -> actix_test::TestRequest {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish();
        actix_test::TestRequest::post()
            .uri("/token-auth/")
            .insert_header(ContentType::form_url_encoded())
            .set_payload(body)
    }

    #[actix_web::test]
    async fn json_credentials_yield_the_token() {
        let app = actix_test::init_service(
            App::new()
                .app_data(state(issuing_admin_token()))
                .configure(configure),
        )
        .await;
        let req = actix_test::TestRequest::post()
            .uri("/token-auth/")
            .set_json(json!({"username": "admin", "password": "123456"}))
            .to_request();
        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        let value: Value = actix_test::read_body_json(res).await;
        assert_eq!(value, json!({ "token": KEY }));
    }

    #[actix_web::test]
    async fn form_credentials_yield_the_token() {
        let app = actix_test::init_service(
            App::new()
                .app_data(state(issuing_admin_token()))
                .configure(configure),
        )
        .await;
        let res = actix_test::call_service(
            &app,
            form(&[("username", "admin"), ("password", "123456")]).to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let value: Value = actix_test::read_body_json(res).await;
        assert_eq!(value["token"], KEY);
    }

    #[actix_web::test]
    async fn rejected_credentials_are_a_bad_request() {
        let app = actix_test::init_service(
            App::new()
                .app_data(state(issuing_admin_token()))
                .configure(configure),
        )
        .await;
        let res = actix_test::call_service(
            &app,
            form(&[("username", "admin"), ("password", "wrong")]).to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let value: Value = actix_test::read_body_json(res).await;
        assert_eq!(value["message"], UNABLE_TO_LOG_IN);
        assert_eq!(value["details"]["non_field_errors"][0], UNABLE_TO_LOG_IN);
    }

    #[rstest]
    #[case(&[("password", "123456")], &["username"])]
    #[case(&[("username", "admin")], &["password"])]
    #[case(&[], &["username", "password"])]
    #[actix_web::test]
    async fn missing_fields_are_named(
        #[case] pairs: &[(&str, &str)],
        #[case] expected: &[&str],
    ) {
        let app = actix_test::init_service(
            App::new()
                .app_data(state(MockTokenIssuer::new()))
                .configure(configure),
        )
        .await;
        let res = actix_test::call_service(&app, form(pairs).to_request()).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let value: Value = actix_test::read_body_json(res).await;
        assert_eq!(value["code"], "invalid_request");
        let details = value["details"].as_object().expect("details");
        assert_eq!(details.len(), expected.len());
        for field in expected {
            assert_eq!(details[*field], json!([FIELD_REQUIRED]));
        }
    }

    #[actix_web::test]
    async fn malformed_json_is_a_bad_request() {
        let app = actix_test::init_service(
            App::new()
                .app_data(state(MockTokenIssuer::new()))
                .configure(configure),
        )
        .await;
        let req = actix_test::TestRequest::post()
            .uri("/token-auth/")
            .insert_header(ContentType::json())
            .set_payload("{\"username\": ")
            .to_request();
        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn get_is_not_allowed() {
        let app = actix_test::init_service(
            App::new()
                .app_data(state(MockTokenIssuer::new()))
                .configure(configure),
        )
        .await;
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/token-auth/").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
        let value: Value = actix_test::read_body_json(res).await;
        assert_eq!(value["message"], "Method \"GET\" not allowed.");
    }
}
