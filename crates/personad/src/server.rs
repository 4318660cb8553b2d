//! HTTP server for personad

use crate::analyzer::Analyzer;
use crate::config::PersonadConfig;
use crate::ollama::OllamaClient;
use crate::routes;
use anyhow::Result;
use axum::Router;
use persona_common::capability::{RateLimiter, WindowRateLimiter};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Application state shared across handlers
pub struct AppState {
    pub analyzer: Analyzer<Arc<OllamaClient>>,
    pub ollama: Arc<OllamaClient>,
    pub rate_limiter: Arc<dyn RateLimiter>,
    pub config: PersonadConfig,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(config: PersonadConfig) -> Result<Self> {
        let ollama = Arc::new(OllamaClient::new(&config.backend)?);
        let rate_limiter = Arc::new(WindowRateLimiter::new(
            Duration::from_secs(config.rate_limit.window_secs),
            config.rate_limit.max_general,
            config.rate_limit.max_sensitive,
            config.rate_limit.max_auth,
        ));

        Ok(Self {
            analyzer: Analyzer::new(Arc::clone(&ollama), &config),
            ollama,
            rate_limiter,
            config,
            start_time: Instant::now(),
        })
    }
}

/// Run the HTTP server
pub async fn run(state: AppState) -> Result<()> {
    let addr = state.config.server.bind_addr.clone();
    let cors_enabled = state.config.server.cors_enabled;
    let state = Arc::new(state);

    let mut app = Router::new()
        .merge(routes::analysis_routes())
        .merge(routes::health_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if cors_enabled {
        app = app.layer(CorsLayer::permissive());
    }

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
