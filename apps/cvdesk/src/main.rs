mod config;
mod data_uri;
mod errors;
mod export;
mod intake;
mod markup;
mod models;
mod presentation;
mod routes;
mod state;
mod storage;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::export::capture::Capturer;
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::build_store;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting cvdesk v{}", env!("CARGO_PKG_VERSION"));

    // Initialize the persisted slot
    let store = build_store(&config);
    info!("Record store initialized ({} backend)", store.backend());

    // Initialize the capture painter (font + logo)
    let capturer = Capturer::from_paths(config.font_path.as_deref(), config.logo_path.as_deref())?;
    if !capturer.has_font() {
        warn!("FONT_PATH not set; PDF exports will return 503");
    }

    let state = AppState::new(config.clone(), store, capturer);

    let app = build_router(state).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
