//! docsift Server
//!
//! HTTP boundary for the extraction pipeline: `POST /extract` and
//! `GET /health`.

#![warn(missing_docs)]

pub mod config;
pub mod handlers;

use config::ServerConfig;
use docsift_extractor::Orchestrator;
use docsift_llm::{AnyProvider, LlmError};
use handlers::{create_router, AppState};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Server error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Backend could not be constructed
    #[error("Backend error: {0}")]
    Backend(#[from] LlmError),

    /// Server binding error
    #[error("Failed to bind server: {0}")]
    Bind(#[from] std::io::Error),

    /// Server error
    #[error("Server error: {0}")]
    Server(String),
}

/// Install the global tracing subscriber (`RUST_LOG`, default `info`)
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build the application state from configuration
pub fn build_state(config: &ServerConfig) -> Result<AppState, ServerError> {
    config.validate()?;
    let backend = AnyProvider::from_config(&config.backend)?;
    Ok(AppState {
        orchestrator: Arc::new(Orchestrator::new(backend, config.extractor.clone())),
        mock_normalization: config.mock_normalization,
    })
}

/// Start the HTTP server
///
/// Builds the backend from configuration and serves until the process is
/// stopped.
pub async fn start_server(config: ServerConfig) -> Result<(), ServerError> {
    init_tracing();

    info!("Starting docsift server");
    info!("Bind address: {}", config.bind_addr());
    info!("Mock normalization: {}", config.mock_normalization);
    info!(
        "Retry limit: {}, attempt timeout: {}s",
        config.extractor.retry_limit, config.extractor.attempt_timeout_secs
    );

    let state = build_state(&config)?;
    let app = create_router(state);

    let listener = TcpListener::bind(&config.bind_addr()).await?;
    info!("docsift listening on {}", config.bind_addr());

    axum::serve(listener, app)
        .await
        .map_err(|e| ServerError::Server(e.to_string()))?;

    Ok(())
}
