use std::sync::Arc;

use anyhow::Context;
use mimalloc::MiMalloc;
use tracing::info;

use veristock::aggregator::HttpAggregator;
use veristock::cache::JsonFileStore;
use veristock::config::Config;
use veristock::gateway::{self, HandlerState};
use veristock::model::{ClipScorerConfig, ModelManager, TextClassifierConfig};
use veristock::pipeline::Enricher;
use veristock::vision::ImageVerifier;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const BANNER: &str = r#"
 _  _  ____  ____  __  ___  ____  __    ___  __ _
/ )( \(  __)(  _ \(  )/ __)(_  _)/  \  / __)(  / )
\ \/ / ) _)  )   / )( \__ \  )( (  O )( (__  )  (
 \__/ (____)(__\_)(__)(___/ (__) \__/  \___)(__\_)
"#;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "veristock=info,tower_http=info".into()),
        )
        .init();

    println!("{}", BANNER);

    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;
    info!(addr = %config.socket_addr(), "Starting veristock");

    let store = Arc::new(
        JsonFileStore::open(&config.storage_path)
            .await
            .context("Failed to open storage directory")?,
    );

    let models = Arc::new(match config.clip_model_path {
        Some(ref path) => ModelManager::new(
            ClipScorerConfig::new(path),
            TextClassifierConfig::new(path),
        ),
        None => ModelManager::stub(),
    });

    let verifier = ImageVerifier::new(models.clone(), config.image_timeout)
        .context("Failed to build image verifier")?;
    let aggregator = HttpAggregator::new(&config.aggregator_url, config.aggregator_timeout)
        .context("Failed to build aggregator client")?;
    let enricher = Arc::new(Enricher::new(aggregator, store.clone(), verifier.clone()));

    let app = gateway::router(HandlerState::new(enricher, store, models, verifier));

    let listener = tokio::net::TcpListener::bind(config.socket_addr())
        .await
        .with_context(|| format!("Failed to bind {}", config.socket_addr()))?;
    info!(addr = %config.socket_addr(), "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
