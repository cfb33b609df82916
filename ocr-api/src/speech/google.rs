use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::config::SpeechConfig;
use crate::gateway::{summarize_body, GatewayError};

use super::{is_supported_language, split_text, SpeechSynthesizer, SynthesisRequest};

const SERVICE: &str = "Google TTS";

/// Client for the public Google Translate speech endpoint (MP3 output, no key).
#[derive(Clone, Debug)]
pub struct GoogleTtsClient {
    client: Client,
    base_url: String,
    slow: bool,
}

impl GoogleTtsClient {
    pub fn new(config: &SpeechConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GatewayError::transport(SERVICE, e))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            slow: config.slow,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/translate_tts", self.base_url)
    }

    async fn fetch_chunk(
        &self,
        chunk: &str,
        language: &str,
        idx: usize,
        total: usize,
    ) -> Result<Vec<u8>, GatewayError> {
        let params: Vec<(&str, String)> = vec![
            ("ie", "UTF-8".to_string()),
            ("client", "tw-ob".to_string()),
            ("tl", language.to_string()),
            ("q", chunk.to_string()),
            ("total", total.to_string()),
            ("idx", idx.to_string()),
            ("textlen", chunk.chars().count().to_string()),
            (
                "ttsspeed",
                if self.slow { "0.24" } else { "1" }.to_string(),
            ),
        ];

        let response = self
            .client
            .get(self.endpoint())
            .query(&params)
            .send()
            .await
            .map_err(|e| GatewayError::transport(SERVICE, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Upstream {
                service: SERVICE,
                status,
                message: summarize_body(&body),
            });
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| GatewayError::transport(SERVICE, e))?;
        if audio.is_empty() {
            return Err(GatewayError::Malformed {
                service: SERVICE,
                detail: format!("empty audio for segment {}/{}", idx + 1, total),
            });
        }

        Ok(audio.to_vec())
    }
}

#[async_trait]
impl SpeechSynthesizer for GoogleTtsClient {
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<Vec<u8>, GatewayError> {
        let language = request.language();
        if !is_supported_language(language) {
            return Err(GatewayError::Rejected {
                service: SERVICE,
                detail: format!("language not supported: {language}"),
            });
        }

        let chunks = split_text(request.text());
        if chunks.is_empty() {
            return Err(GatewayError::Rejected {
                service: SERVICE,
                detail: "no speakable text".to_string(),
            });
        }

        debug!(
            language,
            chars = request.text().chars().count(),
            segments = chunks.len(),
            "Requesting speech"
        );

        // MP3 frames are self-delimiting, so segments concatenate into one playable stream.
        let total = chunks.len();
        let mut audio = Vec::new();
        for (idx, chunk) in chunks.iter().enumerate() {
            audio.extend(self.fetch_chunk(chunk, language, idx, total).await?);
        }

        Ok(audio)
    }
}
