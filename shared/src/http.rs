use lambda_http::{http::StatusCode, Body, Error, Request, Response};
use serde::Serialize;

use crate::error::AdminError;

pub const ALLOW_HEADERS: &str = "Authorization,Content-Type,X-Client-Info,Apikey";

/// Empty 200 answering a CORS preflight
pub fn preflight(allow_methods: &str) -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(StatusCode::OK)
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Methods", allow_methods)
        .header("Access-Control-Allow-Headers", ALLOW_HEADERS)
        .body(Body::Empty)
        .map_err(Box::new)?)
}

pub fn json_response<T: Serialize>(status: StatusCode, value: &T) -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Headers", ALLOW_HEADERS)
        .body(serde_json::to_string(value)?.into())
        .map_err(Box::new)?)
}

pub fn error_response(err: &AdminError) -> Result<Response<Body>, Error> {
    json_response(err.status(), &err.body())
}

pub fn method_not_allowed() -> Result<Response<Body>, Error> {
    json_response(
        StatusCode::METHOD_NOT_ALLOWED,
        &serde_json::json!({"error": "Method not allowed"}),
    )
}

pub fn header<'a>(event: &'a Request, name: &str) -> Option<&'a str> {
    event.headers().get(name).and_then(|v| v.to_str().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preflight_is_empty_with_cors() {
        let resp = preflight("POST,OPTIONS").unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()["Access-Control-Allow-Origin"], "*");
        assert_eq!(resp.headers()["Access-Control-Allow-Headers"], ALLOW_HEADERS);
        assert!(resp.body().is_empty());
    }

    #[test]
    fn error_response_uses_status_and_body() {
        let resp = error_response(&AdminError::DuplicateRole).unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(resp.headers()["Content-Type"], "application/json");
        let body: serde_json::Value = serde_json::from_slice(resp.body()).unwrap();
        assert_eq!(body["error"], "User already has a role assigned");
    }
}
