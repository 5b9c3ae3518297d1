use aws_sdk_cognitoidentityprovider::Client as CognitoClient;
use aws_sdk_dynamodb::Client as DynamoClient;
use aws_sdk_sesv2::Client as SesClient;
use lambda_http::{run, service_fn, tracing, Error, Request};
use reno_shared::config::Config;
use reno_shared::AppState;
use std::sync::Arc;

mod http_handler;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing::init_default_subscriber();

    let config = Config::from_env()?;

    // Initialize AWS clients once at startup
    let aws_config = aws_config::load_from_env().await;
    let state = AppState::from_aws(
        CognitoClient::new(&aws_config),
        DynamoClient::new(&aws_config),
        SesClient::new(&aws_config),
        config,
    );

    run(service_fn(move |event: Request| {
        let state = Arc::clone(&state);
        async move { http_handler::function_handler(event, state).await }
    }))
    .await
}
