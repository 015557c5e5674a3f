use std::sync::Arc;

use aws_config::BehaviorVersion;
use aws_sdk_dynamodb::Client as DynamoClient;
use gallery_block::sync::sync_command_schema;
use gallery_shared::Settings;
use lambda_http::{run, service_fn, Error};

mod app_state;
mod http_handler;

use app_state::AppState;

#[tokio::main]
async fn main() -> Result<(), Error> {
    lambda_http::tracing::init_default_subscriber();

    let settings = Settings::from_env()?;
    let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let dynamo_client = DynamoClient::new(&config);
    let state = Arc::new(AppState::from_settings(&settings, dynamo_client)?);

    match sync_command_schema(&state.gallery.store, state.gallery.registrar.as_ref()).await {
        Ok(count) => tracing::info!("Registered /gallery with {} gallery choice(s)", count),
        Err(e) => tracing::error!("Initial command registration failed: {}", e),
    }

    run(service_fn(move |event| {
        let state = state.clone();
        async move { http_handler::function_handler(event, state).await }
    }))
    .await
}
