mod config;
mod errors;
mod geocoding;
mod llm_client;
mod relay;
mod routes;
mod search;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::geocoding::{NominatimGeocoder, ThrottledGeocoder};
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::search::orchestrator::SearchLoop;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting survey AI service v{}", env!("CARGO_PKG_VERSION"));

    // Completion capability
    let llm = LlmClient::new(
        config.openai_api_key.clone(),
        &config.openai_base_url,
        config.openai_model.clone(),
        Duration::from_secs(config.llm_timeout_secs),
    )?;
    info!("LLM client initialized (model: {})", llm.model());

    // Geocoding capability
    let geocoder = ThrottledGeocoder::new(
        NominatimGeocoder::new(
            config.geocoder_url.clone(),
            Duration::from_secs(config.geocode_timeout_secs),
        )?,
        Duration::from_millis(config.geocode_min_interval_ms),
    );
    info!(
        "Geocoder initialized ({}, {}ms between calls)",
        config.geocoder_url, config.geocode_min_interval_ms
    );

    let search = SearchLoop::new(config.search_max_rounds, config.search_batch_ceiling);
    info!(
        "Search budget: {} rounds of at most {} candidates",
        search.max_rounds, search.batch_ceiling
    );

    let state = AppState {
        completion: Arc::new(llm),
        geocoder: Arc::new(geocoder),
        search,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
