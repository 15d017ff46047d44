//! Prediction service
//!
//! Loads the fitted preprocessor and all three models once at startup into
//! an immutable [`AppState`], then serves single-record predictions over
//! HTTP. Requests share the state read-only, so no locking is needed.

mod api;
mod handlers;
mod state;

pub use api::create_router;
pub use handlers::{PredictRequest, PredictResponse};
pub use state::AppState;

use crate::error::Result;
use crate::paths::ProjectPaths;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),
        }
    }
}

/// Start the prediction service. Fails fast if any artifact is missing.
pub async fn run_server(config: ServerConfig, paths: &ProjectPaths) -> anyhow::Result<()> {
    let state = Arc::new(load_state(paths)?);
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!(host = %config.host, port = config.port, "Prediction service starting");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(address = %addr, "Listening");

    let shutdown_signal = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install CTRL+C signal handler");
        info!("Shutdown signal received, stopping server");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Server shut down cleanly");
    Ok(())
}

fn load_state(paths: &ProjectPaths) -> Result<AppState> {
    let state = AppState::load(paths)?;
    info!(
        models = state.n_models(),
        features = state.preprocessor.n_output_features(),
        "Loaded serving artifacts"
    );
    Ok(state)
}
