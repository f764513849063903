use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ponder_api::{build_router, config::Config, error::ApiError, state::AppState};
use ponder_llm::{ChatClient, OllamaClient};
use ponder_persist::{LocalStore, PersistenceClient};
use ponder_session::TurnRunner;
use ponder_types::SessionConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let config = Config::load().map_err(|e| ApiError::Config(e.to_string()))?;

    init_logging(&config);

    tracing::info!("Starting Ponder API server");
    tracing::info!("Config loaded: {}:{}", config.server.host, config.server.port);

    let store = match &config.store.path {
        Some(path) => LocalStore::open(path).await?,
        None => {
            tracing::warn!("No store path configured, threads will not survive a restart");
            LocalStore::in_memory()
        }
    };
    let store: Arc<dyn PersistenceClient> = Arc::new(store);

    tracing::info!(base_url = %config.llm.base_url, model = %config.llm.model, "Using model backend");
    let client: Arc<dyn ChatClient> = Arc::new(OllamaClient::new(config.llm.base_url.clone())?);

    let runner = TurnRunner::new(Arc::clone(&store), client, SessionConfig::from(&config.llm));
    let state = Arc::new(AppState::new(config.clone(), Arc::clone(&store), runner));

    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Health check: http://{}/health", addr);
    tracing::info!("API docs: http://{}/api-docs/openapi.json", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    store.close().await?;
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

fn init_logging(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.logging.format.as_str() {
        "json" => {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }
}
