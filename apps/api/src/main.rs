mod config;
mod edit;
mod errors;
mod extract;
mod layout;
mod llm_client;
mod models;
mod render;
mod routes;
mod session;
mod state;
mod transform;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::session::SessionStore;
use crate::state::AppState;
use crate::transform::GeminiTransformer;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first; malformed numeric settings abort startup
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CV Architect API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client
    let llm = LlmClient::new(config.gemini_api_key.clone(), config.llm_max_attempts);
    if llm.has_api_key() {
        info!(
            "LLM client initialized (model: {}, max attempts: {})",
            llm_client::MODEL,
            config.llm_max_attempts
        );
    } else {
        warn!("GEMINI_API_KEY is not set; transform requests will fail until it is configured");
    }

    // Expire idle sessions in the background
    let sessions = SessionStore::new();
    if config.session_ttl_secs > 0 {
        sessions.spawn_sweeper(Duration::from_secs(config.session_ttl_secs));
        info!("Sessions expire after {}s idle", config.session_ttl_secs);
    } else {
        warn!("SESSION_TTL_SECS is 0; sessions are kept until deleted");
    }

    // Build app state
    let state = AppState {
        config: config.clone(),
        transformer: Arc::new(GeminiTransformer::new(llm)),
        sessions,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
