//! personad - API persona analysis daemon

use anyhow::Result;
use personad::config::PersonadConfig;
use personad::server::AppState;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    info!("personad v{} starting", env!("CARGO_PKG_VERSION"));

    let config = PersonadConfig::load();

    if PersonadConfig::treblle_configured() {
        info!("Treblle configuration found");
    } else {
        warn!("Treblle not configured. Set TREBLLE_API_KEY and TREBLLE_PROJECT_ID");
    }

    let state = AppState::new(config)?;

    let probe = state.ollama.probe().await;
    if probe.available {
        info!("Ollama reachable with {} models", probe.models.len());
    } else {
        warn!("Ollama not reachable; analyses will use the mock generator");
    }

    personad::server::run(state).await
}
