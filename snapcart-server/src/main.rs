use std::sync::Arc;

use anyhow::Context;
use snapcart_core::AppConfig;
use snapcart_server::{run_server, AppState};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Arc::new(AppConfig::from_env().context("invalid environment configuration")?);
    let port = config.port;
    let state = AppState::from_config(config).context("failed to assemble application state")?;

    run_server(port, state).await
}
