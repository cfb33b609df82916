//! Text Extraction Gateway
//!
//! Sends an uploaded image plus a natural-language instruction to a
//! vision-capable model and returns whatever text the model produced.
//!
//! # Architecture
//!
//! - [`TextExtractor`] is the seam the HTTP layer depends on
//! - [`GeminiClient`] talks to the Gemini `generateContent` endpoint
//! - [`ExtractionProvider`] picks the client at startup and degrades to an
//!   unavailable backend when no credential is configured
//!
//! An empty string is a valid result: it means the model found no text.
//! Every failure is a [`GatewayError`]; nothing is retried.
//!
//! # Usage
//!
//! ```rust,ignore
//! let extractor = ExtractionProvider::new(&config.gemini);
//! let text = extractor
//!     .extract(ExtractionRequest::new(&bytes, "image/png", DEFAULT_PROMPT))
//!     .await?;
//! ```

mod gemini;
mod provider;

use async_trait::async_trait;

use crate::gateway::GatewayError;

pub use gemini::GeminiClient;
pub use provider::ExtractionProvider;

/// Instruction used by `/ocr` and `/ocr-audio`.
pub const DEFAULT_PROMPT: &str =
    "Extract all text from this image. Preserve the layout and structure as much as possible.";

/// Instruction used by `/ocr-with-prompt` when the caller sends none.
pub const DEFAULT_CUSTOM_PROMPT: &str = "Extract all text from this image";

/// One extraction call: the image payload and the instruction for the model.
#[derive(Debug, Clone, Copy)]
pub struct ExtractionRequest<'a> {
    pub image: &'a [u8],
    pub mime_type: &'a str,
    pub prompt: &'a str,
}

impl<'a> ExtractionRequest<'a> {
    pub fn new(image: &'a [u8], mime_type: &'a str, prompt: &'a str) -> Self {
        Self {
            image,
            mime_type,
            prompt,
        }
    }
}

#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Issues exactly one upstream request and returns the model output verbatim.
    async fn extract(&self, request: ExtractionRequest<'_>) -> Result<String, GatewayError>;
}
