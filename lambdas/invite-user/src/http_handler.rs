use lambda_http::{
    http::{Method, StatusCode},
    Body, Error, Request, Response,
};
use reno_shared::{http, invites, AppState};
use std::sync::Arc;

/// Invite an admin or editor. POST only.
pub(crate) async fn function_handler(
    event: Request,
    state: Arc<AppState>,
) -> Result<Response<Body>, Error> {
    let method = event.method();
    tracing::info!("Invite user Lambda invoked - Method: {}", method);

    // Handle CORS preflight
    if method == Method::OPTIONS {
        return http::preflight("POST,OPTIONS");
    }

    if method != Method::POST {
        return http::method_not_allowed();
    }

    let authorization = http::header(&event, "Authorization");
    let origin = http::header(&event, "Origin");
    let body: &[u8] = event.body();

    match invites::invite_user(&state, authorization, origin, body).await {
        Ok(granted) => http::json_response(StatusCode::OK, &granted),
        Err(e) => {
            tracing::warn!("Invite user failed: {}", e);
            http::error_response(&e)
        }
    }
}
