//! Cardioscope Heart-Disease Prediction Server
//!
//! Serves a single-page form that collects thirteen clinical measurements,
//! scores them with a pre-trained classifier loaded once at startup, and
//! renders a styled positive/negative verdict. Also exposes a JSON
//! prediction endpoint and a health check.

use std::path::PathBuf;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use cardioscope_core::ServerConfig;
use cardioscope_model::Predictor;
use cardioscope_server::{api, config, pages, shutdown, AppState};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Load configuration: from CLI arg, env var, or default
    let config = load_server_config()?;

    info!(
        listen_addr = %config.listen_addr,
        model_path = %config.model_path,
        "Starting cardioscope server"
    );

    let listen_addr = config.listen_addr.clone();

    // Build shared application state; aborts here if the classifier
    // cannot be loaded — the process must never serve without one.
    let state = build_app_state(config)?;

    // Build the axum router
    let app = build_router(state);

    // Bind and serve
    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    info!(%listen_addr, "Server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown::shutdown_signal())
        .await?;

    Ok(())
}

/// Load server configuration from a YAML file or fall back to defaults.
///
/// Checks (in order):
/// 1. First CLI argument as config path
/// 2. `CARDIOSCOPE_CONFIG` environment variable
/// 3. Default configuration
fn load_server_config() -> anyhow::Result<ServerConfig> {
    let config_path: Option<PathBuf> = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("CARDIOSCOPE_CONFIG").ok())
        .map(PathBuf::from);

    match config_path {
        Some(path) => {
            info!(path = %path.display(), "Loading configuration from file");
            Ok(config::load_config(&path)?)
        }
        None => {
            info!("No config file specified, using defaults");
            Ok(ServerConfig::default())
        }
    }
}

/// Build the shared [`AppState`] from the server configuration.
fn build_app_state(config: ServerConfig) -> anyhow::Result<Arc<AppState>> {
    let predictor = Predictor::load(&config.model_path)?;
    Ok(Arc::new(AppState { config, predictor }))
}

/// Build the axum [`Router`] with all routes.
fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(pages::index_handler))
        .route("/predict", post(pages::predict_handler))
        .route("/api/v1/predict", post(api::predict_api_handler))
        .route("/health", get(api::health_handler))
        .with_state(state)
}
