//! Read-only user resource.
//!
//! ```text
//! GET /users/                 [{"url":"http://host/users/1/","id":1,"username":"admin"}]
//! GET /users/1/               {"url":"http://host/users/1/","id":1,"username":"admin"}
//! GET /users.json, /users/1.json, ?format=json   same payloads
//! ```
//!
//! Safe verbs are served to every caller. Writes are refused with 403 for
//! every caller and any other verb gets 405.

use actix_web::http::Method;
use actix_web::http::header::{ALLOW, ContentType};
use actix_web::{HttpRequest, HttpResponse, web};
use serde::Serialize;
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::permissions::{AccessRequest, Permission, ReadOnly, is_write};
use crate::domain::{Error, User, UserId};

use super::ApiResult;
use super::current_user::RequestUser;
use super::negotiation::ensure_json;
use super::schemas::ErrorSchema;
use super::state::HttpState;

/// Route name of the collection.
pub const USER_LIST: &str = "user-list";
/// Route name of a single user.
pub const USER_DETAIL: &str = "user-detail";

const ALLOWED_METHODS: &str = "GET, HEAD, OPTIONS";
const PERMISSION_DENIED: &str = "You do not have permission to perform this action.";
const NOT_FOUND: &str = "Not found.";

/// Access policy of the resource.
const POLICY: ReadOnly = ReadOnly;

/// Public projection of a user: never the hash or the account flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct UserRepresentation {
    /// Absolute link to the user's detail route.
    #[schema(example = "http://testserver/users/1/")]
    pub url: String,
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "admin")]
    pub username: String,
}

impl UserRepresentation {
    fn build(req: &HttpRequest, user: &User) -> Result<Self, Error> {
        let url = req
            .url_for(USER_DETAIL, [user.id().to_string()])
            .map_err(|err| Error::internal(format!("failed to build user url: {err}")))?;
        Ok(Self {
            url: url.to_string(),
            id: user.id().get(),
            username: user.username().to_string(),
        })
    }
}

fn authorize(req: &HttpRequest, caller: &RequestUser) -> Result<(), Error> {
    let access = AccessRequest::new(req.method().as_str(), &caller.0);
    if POLICY.has_permission(&access) {
        Ok(())
    } else {
        Err(Error::forbidden(PERMISSION_DENIED))
    }
}

/// JSON body for GET, headers only for HEAD.
fn respond<T: Serialize>(req: &HttpRequest, payload: &T) -> HttpResponse {
    if req.method() == Method::HEAD {
        HttpResponse::Ok().content_type(ContentType::json()).finish()
    } else {
        HttpResponse::Ok().json(payload)
    }
}

fn path_user_id(req: &HttpRequest) -> Result<UserId, Error> {
    req.match_info()
        .get("id")
        .and_then(|raw| raw.parse::<UserId>().ok())
        .ok_or_else(|| Error::not_found(NOT_FOUND))
}

/// List every user, ordered by id.
#[utoipa::path(
    get,
    path = "/users/",
    responses(
        (status = 200, description = "All users", body = [UserRepresentation]),
        (status = 401, description = "Malformed or unknown token", body = ErrorSchema),
        (status = 404, description = "Unknown format override", body = ErrorSchema),
        (status = 406, description = "JSON not acceptable", body = ErrorSchema),
        (status = 503, description = "Credential store unavailable", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
pub async fn list_users(
    req: HttpRequest,
    caller: RequestUser,
    state: web::Data<HttpState>,
) -> ApiResult<HttpResponse> {
    authorize(&req, &caller)?;
    ensure_json(&req)?;
    let users = state.users.list_users().await?;
    let body = users
        .iter()
        .map(|user| UserRepresentation::build(&req, user))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(respond(&req, &body))
}

/// Fetch one user by id.
#[utoipa::path(
    get,
    path = "/users/{id}/",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "The user", body = UserRepresentation),
        (status = 401, description = "Malformed or unknown token", body = ErrorSchema),
        (status = 404, description = "No such user", body = ErrorSchema),
        (status = 406, description = "JSON not acceptable", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "getUser"
)]
pub async fn get_user(
    req: HttpRequest,
    caller: RequestUser,
    state: web::Data<HttpState>,
) -> ApiResult<HttpResponse> {
    authorize(&req, &caller)?;
    ensure_json(&req)?;
    let id = path_user_id(&req)?;
    let user = state.users.find_user(id).await?;
    Ok(respond(&req, &UserRepresentation::build(&req, &user)?))
}

fn options_response(name: &str) -> HttpResponse {
    HttpResponse::Ok().insert_header((ALLOW, ALLOWED_METHODS)).json(json!({
        "name": name,
        "description": "",
        "renders": ["application/json"],
        "parses": [
            "application/json",
            "application/x-www-form-urlencoded",
            "multipart/form-data"
        ],
    }))
}

async fn list_options(req: HttpRequest, caller: RequestUser) -> ApiResult<HttpResponse> {
    authorize(&req, &caller)?;
    Ok(options_response("User List"))
}

async fn detail_options(req: HttpRequest, caller: RequestUser) -> ApiResult<HttpResponse> {
    authorize(&req, &caller)?;
    Ok(options_response("User Instance"))
}

/// Fallback for verbs without a route.
async fn reject_method(req: HttpRequest, caller: RequestUser) -> ApiResult<HttpResponse> {
    let method = req.method().as_str();
    if is_write(method) {
        authorize(&req, &caller)?;
    }
    Err(Error::method_not_allowed(method))
}

fn collection(path: &str) -> actix_web::Resource {
    web::resource(path)
        .route(web::get().to(list_users))
        .route(web::head().to(list_users))
        .route(web::method(Method::OPTIONS).to(list_options))
        .default_service(web::to(reject_method))
}

fn member(path: &str) -> actix_web::Resource {
    web::resource(path)
        .route(web::get().to(get_user))
        .route(web::head().to(get_user))
        .route(web::method(Method::OPTIONS).to(detail_options))
        .default_service(web::to(reject_method))
}

/// Register the canonical and `.json` suffixed user routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(collection("/users/").name(USER_LIST))
        .service(collection("/users.{format:json}"))
        .service(member(r"/users/{id:\d+}/").name(USER_DETAIL))
        .service(member(r"/users/{id:\d+}.{format:json}"));
}
