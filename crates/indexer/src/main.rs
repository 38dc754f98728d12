#[cfg(not(target_os = "windows"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use abex_indexer::{app, logging, metrics, state::AppState};
use config::{Args, IndexerConfig};
use std::net::SocketAddr;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse_args();
    let config = IndexerConfig::from_env_file(&args.env_file)?;

    let loki_url = config.metrics.loki_url();
    let _log_guard = logging::init_with_config(logging::LoggingConfig::new(
        &config.log,
        loki_url.as_deref(),
    ))?;

    metrics::init(&config.metrics.prometheus_prefix)?;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    tracing::info!("Log level: {}", config.log.level);
    tracing::info!("Network: {}", config.network.network);
    tracing::info!("Bound packages: {}", config.network.package_addresses.join(", "));
    if config.metrics.enabled {
        tracing::info!("Metrics exposed on /metrics");
    }

    let state = AppState::new(config)?;
    let app = app::create_app(state);

    tracing::info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
