use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;
use warrant_core::{LoggingConfig, WarrantConfig};
use warrant_server::{AppState, create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = WarrantConfig::load().context("failed to load configuration")?;
    config.validate()?;

    init_tracing(&config.logging);

    let bind = config.server.bind.clone();
    let state = AppState::init(config).await?;
    let app = create_router(state);

    let listener = TcpListener::bind(&bind)
        .await
        .with_context(|| format!("failed to bind {bind}"))?;
    info!(address = %bind, "warrant-server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("warrant-server stopped");
    Ok(())
}

/// `RUST_LOG` takes precedence over the configured level.
fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
