use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::http::{HeaderValue, Method, header};
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, TraceLayer};

// Use modules from the library crate
use caseline_backend::config::Config;
use caseline_backend::llm::gemini_client::build_gemini_client;
use caseline_backend::logging::init_subscriber;
use caseline_backend::routes::api_router;
use caseline_backend::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_subscriber();

    tracing::info!("Starting Caseline backend server...");

    let config = Config::load().context("failed to load configuration")?;
    if config.gemini_api_key.is_none() {
        anyhow::bail!("GEMINI_API_KEY must be set");
    }

    let ai_client = build_gemini_client().context("failed to build Gemini client")?;
    let app_state = AppState::new(config, ai_client);

    // Idle rate-limit entries are evicted in the background.
    Arc::clone(&app_state.rate_limiter).spawn_cleanup(Duration::from_secs(300));

    let cors = CorsLayer::new()
        .allow_origin(
            app_state
                .config
                .frontend_base_url
                .parse::<HeaderValue>()
                .context("invalid FRONTEND_BASE_URL")?,
        )
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true);

    let app = api_router(app_state.clone()).layer(cors).layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::default().include_headers(true)),
    );

    let addr: SocketAddr = format!("{}:{}", app_state.config.host, app_state.config.port)
        .parse()
        .context("invalid server address")?;

    tracing::info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(%error, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received, stopping server...");
}
