use std::net::SocketAddr;

use anyhow::Context;

use minibank_api::app::App;
use minibank_api::config::ApiConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ApiConfig::from_env().context("invalid configuration")?;
    minibank_observability::init(&config.log);

    if config.insecure_default_secret {
        tracing::warn!("JWT_SECRET not set; using insecure dev default");
    }

    let App { router, audit } = minibank_api::app::build_app(&config)?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!(addr = %listener.local_addr()?, "listening");

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

    // The router owned the last bus handles; drain what is still queued.
    tokio::task::spawn_blocking(move || audit.shutdown())
        .await
        .context("audit worker panicked")?;

    tracing::info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}
