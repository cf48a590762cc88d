//! Content negotiation for JSON-only resources.
//!
//! The resource renders JSON and nothing else, so negotiation only decides
//! whether the caller can accept it. A `.json` suffix or `?format=json`
//! override wins over the `Accept` header.

use actix_web::HttpRequest;
use actix_web::http::header::ACCEPT;

use crate::domain::Error;

/// Only format understood by the user resource.
pub const JSON_FORMAT: &str = "json";

const FORMAT_PARAM: &str = "format";
const NOT_ACCEPTABLE: &str = "Could not satisfy the request Accept header.";

/// Whether a single `Accept` media range admits `application/json`.
fn admits_json(range: &str) -> bool {
    let mut pieces = range.split(';').map(str::trim);
    let media = pieces.next().unwrap_or_default().to_ascii_lowercase();
    let refused = pieces.any(|param| {
        param
            .split_once('=')
            .is_some_and(|(name, value)| {
                name.trim().eq_ignore_ascii_case("q")
                    && value.trim().parse::<f32>().is_ok_and(|q| q <= 0.0)
            })
    });
    !refused && matches!(media.as_str(), "application/json" | "application/*" | "*/*")
}

fn format_override(req: &HttpRequest) -> Option<String> {
    url::form_urlencoded::parse(req.query_string().as_bytes())
        .find(|(name, _)| name == FORMAT_PARAM)
        .map(|(_, value)| value.into_owned())
}

/// Check that the caller accepts JSON.
///
/// Unknown `format` overrides are a 404, as if the suffixed route did not
/// exist. An `Accept` header with no JSON-compatible range is a 406.
pub fn ensure_json(req: &HttpRequest) -> Result<(), Error> {
    if req.match_info().get(FORMAT_PARAM).is_some() {
        return Ok(());
    }
    if let Some(format) = format_override(req) {
        return if format == JSON_FORMAT {
            Ok(())
        } else {
            Err(Error::not_found("Not found."))
        };
    }

    let Some(accept) = req.headers().get(ACCEPT) else {
        return Ok(());
    };
    let accept = accept
        .to_str()
        .map_err(|_| Error::not_acceptable(NOT_ACCEPTABLE))?;
    if accept.trim().is_empty() || accept.split(',').any(admits_json) {
        Ok(())
    } else {
        Err(Error::not_acceptable(NOT_ACCEPTABLE))
    }
}
