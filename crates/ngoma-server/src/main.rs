//! Ngoma Music Server - HTTP API for ACE-Step music generation

use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod error;
mod state;

use ngoma_core::{EngineConfig, MusicEngine, ServerConfig};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ngoma_server=debug,ngoma_core=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Ngoma Music Server");

    let engine_config = EngineConfig {
        device: ngoma_core::DevicePreference::from_env(),
        ..EngineConfig::default()
    };
    let server_config = ServerConfig::from_env();
    info!("Checkpoint directory: {:?}", engine_config.checkpoint_dir);
    info!("Output directory: {:?}", engine_config.output_dir);

    // Create the engine and load the checkpoint before accepting traffic.
    let engine = MusicEngine::new(engine_config)?;
    let pipeline_info = engine.load_checkpoint().await?;
    info!("Pipeline ready on device: {}", pipeline_info.device);

    let state = AppState::new(engine, server_config.response_mode);

    // Build router
    let app = api::create_router(state.clone());

    // Start server
    let addr = format!("{}:{}", server_config.host, server_config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);

    let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal());

    info!("Server ready. Press Ctrl+C to stop.");
    server.await?;

    Ok(())
}

/// Wait for a shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down...");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down...");
        },
    }
}
