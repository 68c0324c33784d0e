use std::net::SocketAddr;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;
use legal_agents::{config::Config, create_router, utils::init_logger, AppState, ServiceKind};

#[derive(Parser, Debug)]
#[command(name = "legal-agents", version, about = "Legal Q&A agents and registry lookup service")]
struct Args {
    /// Which service(s) to serve
    #[arg(long, value_enum, default_value = "all")]
    service: ServiceKind,

    /// Port override (defaults to PORT)
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load configuration
    let mut config = Config::from_env()?;
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let _log_guard = init_logger(&config.logging);
    info!("Configuration loaded: {:?}", config.server);

    // Clients are built once here and live until shutdown
    let state = AppState::from_config(config.clone())?;
    let app = create_router(state, args.service);

    let host: std::net::IpAddr = config.server.host.parse()?;
    let addr = SocketAddr::from((host, config.server.port));
    info!(service = ?args.service, "Server listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    info!("Server stopped, HTTP clients released");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
