use anyhow::Context;
use core_audio::ProcessingConfig;
use core_runtime::config::{EnvReader, ServerConfig};
use core_runtime::logging::init_logging;
use core_service::bootstrap_desktop;
use core_streaming::FeedConfig;
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = EnvReader::from_process();
    let config = ServerConfig::from_env(&env).context("invalid server configuration")?;
    init_logging(config.logging.clone()).context("failed to initialise logging")?;

    let processing = ProcessingConfig::from_env(&env).context("invalid processing configuration")?;
    let feed = FeedConfig::from_env(&env).context("invalid feed configuration")?;
    info!(?config, ?processing, feeds = feed.sources.len(), "Starting retune server");

    let core = bootstrap_desktop(&config, &processing, feed)
        .await
        .context("failed to initialise core service")?;
    let app = retune_server::router(core, config.max_upload_bytes);

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    info!(addr = %listener.local_addr()?, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}
