use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::config::ServerConfig;
use crate::core::splice::PlaceholderSplicer;
use crate::core::storage::{ArtifactStore, ExpirySweeper};
use crate::core::tts::{SynthesisOptions, Synthesizer, create_synthesizer};
use crate::errors::app_error::AppResult;

/// Shared application state handed to every handler.
///
/// Owns the artifact store and its background sweeper. The sweeper starts
/// when the state is built and stops on [`shutdown`](Self::shutdown).
pub struct AppState {
    pub config: ServerConfig,
    pub splicer: PlaceholderSplicer,
    pub artifacts: Arc<ArtifactStore>,
    sweeper: ExpirySweeper,
}

impl AppState {
    /// Build state with the configured voice engine.
    pub async fn new(config: ServerConfig) -> AppResult<Arc<Self>> {
        let synthesizer = create_synthesizer(&config.synthesis)?;
        Self::with_synthesizer(config, synthesizer).await
    }

    /// Build state around an existing synthesizer.
    pub async fn with_synthesizer(
        config: ServerConfig,
        synthesizer: Arc<dyn Synthesizer>,
    ) -> AppResult<Arc<Self>> {
        let artifacts = Arc::new(ArtifactStore::from_config(
            &config.storage,
            &config.public_base_url,
        )?);

        let sweeper = ExpirySweeper::start(
            artifacts.clone(),
            Duration::from_secs(config.storage.sweep_interval_seconds),
        );

        info!(
            "Using {} synthesizer at {}",
            synthesizer.name(),
            config.synthesis.url
        );
        let splicer = PlaceholderSplicer::new(
            synthesizer,
            SynthesisOptions::from_config(&config.synthesis),
        );

        Ok(Arc::new(Self {
            config,
            splicer,
            artifacts,
            sweeper,
        }))
    }

    /// Stop background work. Called once the server has drained.
    pub async fn shutdown(&self) {
        self.sweeper.stop().await;
    }
}
