use lambda_http::{http::StatusCode, Body, Error, Request, Response};
use reno_shared::{bootstrap, http, AppState};
use std::sync::Arc;

/// Grant the first admin. Any method other than OPTIONS runs the bootstrap.
pub(crate) async fn function_handler(
    event: Request,
    state: Arc<AppState>,
) -> Result<Response<Body>, Error> {
    tracing::info!("Bootstrap admin Lambda invoked - Method: {}", event.method());

    // Handle CORS preflight
    if event.method() == "OPTIONS" {
        return http::preflight("GET,POST,OPTIONS");
    }

    let authorization = http::header(&event, "Authorization");

    match bootstrap::bootstrap_admin(&state, authorization).await {
        Ok(granted) => http::json_response(StatusCode::OK, &granted),
        Err(e) => {
            tracing::warn!("Bootstrap admin failed: {}", e);
            http::error_response(&e)
        }
    }
}
