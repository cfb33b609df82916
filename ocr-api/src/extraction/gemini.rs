use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::config::GeminiConfig;
use crate::gateway::{summarize_body, GatewayError};

use super::{ExtractionRequest, TextExtractor};

const SERVICE: &str = "Gemini";

#[derive(Clone, Debug)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text {
        text: &'a str,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: Blob<'a>,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Blob<'a> {
    mime_type: &'a str,
    data: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl GenerateContentResponse {
    fn into_text(self) -> Result<String, GatewayError> {
        let Some(candidate) = self.candidates.into_iter().next() else {
            let detail = match self.prompt_feedback.and_then(|f| f.block_reason) {
                Some(reason) => format!("prompt blocked ({reason})"),
                None => "no candidates returned".to_string(),
            };
            return Err(GatewayError::Rejected {
                service: SERVICE,
                detail,
            });
        };

        let parts = candidate.content.map(|c| c.parts).unwrap_or_default();
        if parts.is_empty() {
            if let Some(reason) = candidate.finish_reason.filter(|r| r != "STOP") {
                return Err(GatewayError::Rejected {
                    service: SERVICE,
                    detail: format!("generation stopped ({reason})"),
                });
            }
        }

        Ok(parts.into_iter().filter_map(|p| p.text).collect())
    }
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig) -> Result<Self, GatewayError> {
        let api_key = config.api_key.trim();
        if api_key.is_empty() {
            return Err(GatewayError::Unavailable {
                service: SERVICE,
                reason: "GEMINI_API_KEY is not set".to_string(),
            });
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GatewayError::transport(SERVICE, e))?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config
                .model
                .trim_start_matches("models/")
                .to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

#[async_trait]
impl TextExtractor for GeminiClient {
    async fn extract(&self, request: ExtractionRequest<'_>) -> Result<String, GatewayError> {
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![
                    Part::Text {
                        text: request.prompt,
                    },
                    Part::InlineData {
                        inline_data: Blob {
                            mime_type: request.mime_type,
                            data: STANDARD.encode(request.image),
                        },
                    },
                ],
            }],
        };

        debug!(
            model = %self.model,
            mime_type = request.mime_type,
            bytes = request.image.len(),
            "Sending image to Gemini"
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::transport(SERVICE, e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| GatewayError::transport(SERVICE, e))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorEnvelope>(&text)
                .map(|envelope| envelope.error.message)
                .unwrap_or_else(|_| summarize_body(&text));
            return Err(GatewayError::Upstream {
                service: SERVICE,
                status,
                message,
            });
        }

        let parsed: GenerateContentResponse =
            serde_json::from_str(&text).map_err(|e| GatewayError::Malformed {
                service: SERVICE,
                detail: e.to_string(),
            })?;

        parsed.into_text()
    }
}
