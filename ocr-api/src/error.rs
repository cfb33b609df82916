use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::gateway::GatewayError;
use crate::speech::SpeechError;
use crate::upload::ValidationError;

pub const IMAGE_PROCESSING: &str = "Error processing image";
pub const AUDIO_CONVERSION: &str = "Error converting text to audio";

/// Every way a request can fail. Only [`IntoResponse`] turns a kind into a status code.
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("No text found in the image.")]
    NoTextFound,

    #[error("Text cannot be empty.")]
    EmptyText,

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// Malformed form or multipart body, with the status the framework chose.
    #[error("{message}")]
    Form { status: StatusCode, message: String },

    /// Catch-all for decode and upstream failures. The caller sees only the
    /// summarised cause; the full chain is logged.
    #[error("{context}: {source}")]
    Processing {
        context: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl AppError {
    pub fn processing(context: &'static str, source: impl Into<anyhow::Error>) -> Self {
        AppError::Processing {
            context,
            source: source.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(ValidationError::UnsupportedType { .. }) => StatusCode::BAD_REQUEST,
            AppError::Validation(ValidationError::TooLarge { .. }) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::NoTextFound => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::EmptyText => StatusCode::BAD_REQUEST,
            AppError::MissingField(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Form { status, .. } => *status,
            AppError::Processing { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Upstream service behind a processing failure, if a gateway caused it.
    pub fn upstream_service(&self) -> Option<&'static str> {
        match self {
            AppError::Processing { source, .. } => source
                .downcast_ref::<GatewayError>()
                .map(GatewayError::service),
            _ => None,
        }
    }

    /// Maps a synthesis failure on the text-to-audio path.
    pub fn from_speech(err: SpeechError) -> Self {
        match err {
            SpeechError::EmptyInput => AppError::EmptyText,
            SpeechError::Gateway(e) => AppError::processing(AUDIO_CONVERSION, e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if let AppError::Processing { context, source } = &self {
            let service = self.upstream_service().unwrap_or("none");
            tracing::error!(service, error = ?source, "{}: {:#}", context, source);
        }

        let body = Json(json!({
            "detail": self.to_string(),
            "code": status.as_u16()
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let unsupported = AppError::Validation(ValidationError::UnsupportedType {
            content_type: "text/plain".into(),
            allowed: vec!["image/png".into()],
        });
        let too_large = AppError::Validation(ValidationError::TooLarge {
            size: 2,
            limit: 1,
            limit_mb: 0.0,
        });

        assert_eq!(unsupported.status(), StatusCode::BAD_REQUEST);
        assert_eq!(too_large.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(AppError::NoTextFound.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(AppError::EmptyText.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::MissingField("file").status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::processing(IMAGE_PROCESSING, anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_processing_message_is_summarised() {
        let root = std::io::Error::new(std::io::ErrorKind::Other, "socket closed");
        let err = AppError::processing(
            IMAGE_PROCESSING,
            anyhow::Error::new(root).context("Gemini request failed"),
        );
        assert_eq!(
            err.to_string(),
            "Error processing image: Gemini request failed"
        );
    }

    #[test]
    fn test_speech_errors_map_by_kind() {
        assert!(matches!(
            AppError::from_speech(SpeechError::EmptyInput),
            AppError::EmptyText
        ));

        let err = AppError::from_speech(SpeechError::Gateway(GatewayError::Rejected {
            service: "Google TTS",
            detail: "language not supported: xx".into(),
        }));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            err.to_string(),
            "Error converting text to audio: Google TTS rejected the request: language not supported: xx"
        );
    }

    #[test]
    fn test_upstream_service_names_the_gateway() {
        let err = AppError::processing(
            IMAGE_PROCESSING,
            GatewayError::Unavailable {
                service: "Gemini",
                reason: "GEMINI_API_KEY is not set".into(),
            },
        );
        assert_eq!(err.upstream_service(), Some("Gemini"));

        let decode = AppError::processing(IMAGE_PROCESSING, anyhow::anyhow!("bad header"));
        assert_eq!(decode.upstream_service(), None);
        assert_eq!(AppError::NoTextFound.upstream_service(), None);
    }
}
