//! Browsable entry point listing the API collections.

use actix_web::{HttpRequest, HttpResponse, web};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::Error;

use super::ApiResult;
use super::negotiation::ensure_json;
use super::users::USER_LIST;

/// Links to every collection.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiRoot {
    #[schema(example = "http://testserver/users/")]
    pub users: String,
}

/// List the collections with absolute links.
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Collection links", body = ApiRoot)),
    tags = ["root"],
    operation_id = "apiRoot"
)]
pub async fn api_root(req: HttpRequest) -> ApiResult<HttpResponse> {
    ensure_json(&req)?;
    let users = req
        .url_for_static(USER_LIST)
        .map_err(|err| Error::internal(format!("failed to build users url: {err}")))?;
    Ok(HttpResponse::Ok().json(ApiRoot {
        users: users.to_string(),
    }))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/")
            .name("api-root")
            .route(web::get().to(api_root)),
    );
}
