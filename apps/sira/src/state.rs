use std::sync::Arc;

use anyhow::Result;

use crate::config::Config;
use crate::export::{DirectorySink, DocumentExporter, FileSink};
use crate::llm_client::{build_client, GenerationClient};
use crate::session::LocalSessionGate;

/// Shared collaborators handed to the UI loop.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Pluggable generation provider, chosen by GENERATION_PROVIDER.
    pub client: Arc<dyn GenerationClient>,
    pub exporter: DocumentExporter,
    pub sink: Arc<dyn FileSink>,
    pub gate: Arc<LocalSessionGate>,
}

impl AppState {
    pub fn from_config(config: Config) -> Result<Self> {
        Ok(Self {
            client: build_client(&config)?,
            exporter: DocumentExporter::new(config.export_layout).with_language(config.language),
            sink: Arc::new(DirectorySink::new(config.export_dir.clone())),
            gate: Arc::new(LocalSessionGate::new()),
            config,
        })
    }
}
