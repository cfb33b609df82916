//! Speech Synthesis Gateway
//!
//! Turns text into MP3 audio through a third-party text-to-speech service.
//! Empty input is rejected when the [`SynthesisRequest`] is built, so a
//! [`SpeechSynthesizer`] is never called with nothing to say.

mod chunker;
mod google;
mod languages;

use async_trait::async_trait;
use thiserror::Error;

use crate::gateway::GatewayError;

pub use chunker::{split_text, MAX_CHUNK_CHARS};
pub use google::GoogleTtsClient;
pub use languages::{is_supported_language, DEFAULT_LANGUAGE};

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("Text cannot be empty.")]
    EmptyInput,

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Text plus the language to speak it in. Text is never empty or whitespace-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisRequest {
    text: String,
    language: String,
}

impl SynthesisRequest {
    pub fn new(text: impl Into<String>, language: impl Into<String>) -> Result<Self, SpeechError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(SpeechError::EmptyInput);
        }

        let language = language.into();
        let language = match language.trim() {
            "" => DEFAULT_LANGUAGE.to_string(),
            lang => lang.to_string(),
        };

        Ok(Self { text, language })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn language(&self) -> &str {
        &self.language
    }
}

#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Returns the complete encoded audio (MP3) for the request.
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<Vec<u8>, GatewayError>;
}
