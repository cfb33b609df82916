use std::sync::Arc;

use crate::config::Config;
use crate::extraction::TextExtractor;
use crate::speech::SpeechSynthesizer;
use crate::upload::UploadValidator;

/// Shared by every request. Nothing in here is mutated after startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub validator: UploadValidator,
    pub extractor: Arc<dyn TextExtractor>,
    pub synthesizer: Arc<dyn SpeechSynthesizer>,
}

impl AppState {
    pub fn new(
        config: Config,
        extractor: Arc<dyn TextExtractor>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
    ) -> Self {
        let validator = UploadValidator::new(&config.upload);

        Self {
            config: Arc::new(config),
            validator,
            extractor,
            synthesizer,
        }
    }
}
