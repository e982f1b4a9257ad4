mod config;
mod errors;
mod export;
mod generation;
mod llm_client;
mod models;
mod render;
mod session;
mod state;
mod ui;
mod view;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Logs go to stderr so they never interleave with the prompts on stdout
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting Sira v{}", env!("CARGO_PKG_VERSION"));

    let state = AppState::from_config(config)?;
    info!(
        "Generation client initialized (provider: {})",
        state.client.provider()
    );
    info!(
        "Exporting to {} ({:?} layout)",
        state.config.export_dir.display(),
        state.config.export_layout
    );

    ui::run(state).await
}
