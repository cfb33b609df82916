use async_trait::async_trait;
use tracing::{info, warn};

use crate::config::GeminiConfig;
use crate::gateway::GatewayError;

use super::{ExtractionRequest, GeminiClient, TextExtractor};

enum ExtractionBackend {
    Gemini(GeminiClient),
    Unavailable { reason: String },
}

/// Extraction gateway chosen at startup.
///
/// Construction never fails: a missing credential yields an unavailable backend
/// so the server can still start and answer `/health`.
pub struct ExtractionProvider {
    backend: ExtractionBackend,
}

impl ExtractionProvider {
    pub fn new(config: &GeminiConfig) -> Self {
        let backend = match GeminiClient::new(config) {
            Ok(client) => {
                info!(model = %client.model(), "Gemini API configured");
                ExtractionBackend::Gemini(client)
            }
            Err(e) => {
                let reason = e.to_string();
                warn!("{} - text extraction requests will fail", reason);
                ExtractionBackend::Unavailable { reason }
            }
        };

        Self { backend }
    }

    pub fn is_available(&self) -> bool {
        !matches!(self.backend, ExtractionBackend::Unavailable { .. })
    }
}

#[async_trait]
impl TextExtractor for ExtractionProvider {
    async fn extract(&self, request: ExtractionRequest<'_>) -> Result<String, GatewayError> {
        match &self.backend {
            ExtractionBackend::Gemini(client) => client.extract(request).await,
            ExtractionBackend::Unavailable { reason } => Err(GatewayError::Unavailable {
                service: "Gemini",
                reason: reason.clone(),
            }),
        }
    }
}
