//! gymlog HTTP server
//!
//! Serves the workout log over JSON for clients that hold an API key.
//!
//! # Configuration
//!
//! Environment variables:
//! - `GYMLOG_PORT`: Port to listen on (default: 8080)
//! - `GYMLOG_SERVER_CONFIG`: Path to the API key file (default: ~/.config/gymlog/server.yaml)
//!
//! The entry store is chosen by the regular gymlog config file and its
//! `GYMLOG_*` overrides (see `gymlog config show`).

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gymlog::backend;
use gymlog::config::Config;
use gymlog::server::{router, ApiKeyStore, AppState};

/// Server configuration
#[derive(Debug, Clone)]
struct ServerConfig {
    /// Port to listen on
    port: u16,
    /// Path to the API key file
    config_path: PathBuf,
}

impl ServerConfig {
    /// Load configuration from environment variables
    fn from_env() -> Self {
        let port = std::env::var("GYMLOG_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        let config_path = std::env::var("GYMLOG_SERVER_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| Config::default_config_dir().join("server.yaml"));

        Self { port, config_path }
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        tracing::error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gymlog=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let server_config = ServerConfig::from_env();
    let config = Config::load(None)?;

    tracing::info!("Backend: {}", config.backend.value);
    tracing::info!("API key file: {}", server_config.config_path.display());

    let store = backend::entry_store(&config, None).await?;
    let api_keys = ApiKeyStore::load(&server_config.config_path);

    let state = AppState {
        store: Arc::from(store),
        api_keys: Arc::new(api_keys),
    };

    let app = router(state).layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], server_config.port));
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
