use std::sync::Arc;

use crate::{
    config::ServerConfig,
    core::{scratch::ScratchDir, verify::Verifier},
    domain::ports::Decoder,
    utils::error::Result,
};

/// Built once at startup, shared by every request.
pub struct AppState {
    pub config: ServerConfig,
    pub scratch: ScratchDir,
    pub verifier: Verifier,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Result<Arc<Self>> {
        let decoder = config.decoder.build();
        Self::with_decoder(config, decoder)
    }

    pub fn with_decoder(config: ServerConfig, decoder: Arc<dyn Decoder>) -> Result<Arc<Self>> {
        let scratch = ScratchDir::new(&config.upload_dir)?;
        let verifier = Verifier::new(decoder);

        tracing::info!(
            "Uploads go to {} and are decoded by the {} decoder",
            scratch.root().display(),
            verifier.decoder_name()
        );

        Ok(Arc::new(Self {
            config,
            scratch,
            verifier,
        }))
    }
}
