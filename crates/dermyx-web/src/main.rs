//! Dermyx Web Server
//!
//! Run with: cargo run -p dermyx-web

use dermyx_common::DermyxConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting Dermyx Web Server...");

    let config = DermyxConfig::load()?;
    let state = dermyx_web::state::AppState::from_config(&config)?;
    info!(mode = ?state.mode, classifier = state.classifier.is_some(), "Catalog selected");

    let app = dermyx_web::router::build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    info!("Server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
