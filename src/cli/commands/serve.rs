use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use tokio::net::TcpListener;

use crate::config::AppConfig;
use crate::state::init_app_state;

#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    #[arg(long, help = "Port to listen on (overrides AFRIART_API_PORT)")]
    pub port: Option<u16>,

    #[arg(long, help = "Directory for uploaded images (overrides UPLOAD_DIR)")]
    pub uploads_dir: Option<PathBuf>,
}

pub async fn handle(args: ServeArgs, mut config: AppConfig) -> anyhow::Result<()> {
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(dir) = args.uploads_dir {
        config.uploads.dir = dir;
    }

    tracing::info!("Starting AfriArt API in {:?} mode", config.environment);

    let bind_addr = config.bind_addr();
    let state = init_app_state(config).context("failed to initialise application state")?;
    tracing::info!("Serving uploads from {}", state.uploads.dir().display());

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("AfriArt API listening on http://{}", bind_addr);

    axum::serve(listener, crate::app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

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
