#![deny(clippy::all)]

use anyhow::Context;
use tracing::{info, warn};
use voxchat::config::Config;
use voxchat::http::{create_router, AppState};
use voxchat::relay::RelayClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Pick up OPENAI_API_KEY from a local .env, if present
    dotenvy::dotenv().ok();

    // Initialize tracing for structured logging
    tracing_subscriber::fmt::init();

    let config = Config::load()?;

    let relay = RelayClient::from_env(&config.completion)?;
    if relay.is_configured() {
        info!("Completion API credential found");
    } else {
        // Not fatal: absence surfaces per-request as a configuration error.
        warn!("OPENAI_API_KEY is not set - chat requests will fail until it is configured");
    }
    info!(model = %config.completion.model, "Completion relay ready");

    let state = AppState::new(relay);
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind_addr))?;
    info!("Relay endpoint listening on {}", config.server.bind_addr);

    axum::serve(listener, router)
        .await
        .context("HTTP server error")?;

    Ok(())
}
