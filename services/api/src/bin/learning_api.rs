//! services/api/src/bin/learning_api.rs

use async_openai::{config::OpenAIConfig, Client};
use axum::http::{
    header::{ACCEPT, CONTENT_TYPE},
    HeaderValue, Method,
};
use learning_api_lib::{
    adapters::OpenAiStructuredAdapter,
    config::Config,
    error::ApiError,
    fixtures,
    web::{self, spawn_recommendation_refresh, state::AppState},
};
use learning_core::ContentGateway;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Initialize the Generation Adapter ---
    let endpoint = config.ai_endpoint()?;
    let mut openai_config = OpenAIConfig::new().with_api_key(endpoint.api_key);
    if let Some(base_url) = endpoint.base_url {
        info!("Using generation endpoint {}", base_url);
        openai_config = openai_config.with_api_base(base_url);
    }
    let openai_client = Client::with_config(openai_config);
    let generation_adapter = Arc::new(OpenAiStructuredAdapter::new(
        openai_client,
        config.ai_model.clone(),
        config.ai_timeout,
    ));
    let gateway = ContentGateway::new(generation_adapter);

    // --- 3. Build the Shared AppState from the seeded catalog ---
    let app_state = Arc::new(AppState::new(
        config.clone(),
        gateway,
        fixtures::seed_user(),
        fixtures::seed_courses(),
    ));

    // --- 4. Kick off the dashboard's first recommendation load ---
    if let Err(e) =
        spawn_recommendation_refresh(app_state.clone(), config.default_interests.clone()).await
    {
        warn!("Initial recommendation load not started: {}", e);
    }

    // --- 5. Create the Web Router ---
    let origin = config
        .cors_origin
        .parse::<HeaderValue>()
        .map_err(|e| ApiError::CorsOrigin {
            origin: config.cors_origin.clone(),
            reason: e.to_string(),
        })?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, ACCEPT]);
    let app = web::router(app_state).layer(cors);

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
