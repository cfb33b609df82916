//! Image upload handlers.
//!
//! All three endpoints share one pipeline: validate the upload, sanity-check
//! the image header, then ask the extractor for text. They differ only in the
//! prompt they send and in what they do with the text afterwards.

use axum::extract::State;
use axum::response::Response;
use serde::Deserialize;

use crate::api::extractors::{QueryParams, UploadForm};
use crate::api::response::{attachment, ErrorBody, AUDIO_MPEG, TEXT_PLAIN_UTF8};
use crate::api::state::AppState;
use crate::error::{AppError, Result, IMAGE_PROCESSING};
use crate::extraction::{ExtractionRequest, DEFAULT_CUSTOM_PROMPT, DEFAULT_PROMPT};
use crate::speech::{SynthesisRequest, DEFAULT_LANGUAGE};
use crate::upload::{verify_image, UploadedAsset};

/// Optional query-string overrides. Form fields take precedence.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OcrQuery {
    /// Instruction for the model (`/ocr-with-prompt` only).
    pub prompt: Option<String>,
    /// Speech language code (`/ocr-audio` only).
    pub lang: Option<String>,
}

impl OcrQuery {
    fn prompt(&self) -> Option<&str> {
        self.prompt.as_deref().filter(|p| !p.trim().is_empty())
    }

    fn lang(&self) -> Option<&str> {
        self.lang.as_deref().filter(|l| !l.trim().is_empty())
    }
}

async fn extract(state: &AppState, file: &UploadedAsset, prompt: &str) -> Result<String> {
    tracing::info!("Processing OCR request for file: {}", file.display_name());

    state.validator.validate_asset(file)?;

    let (width, height) =
        verify_image(&file.bytes).map_err(|e| AppError::processing(IMAGE_PROCESSING, e))?;
    tracing::debug!(width, height, bytes = file.bytes.len(), "image header verified");

    let text = state
        .extractor
        .extract(ExtractionRequest::new(
            &file.bytes,
            &file.content_type,
            prompt,
        ))
        .await
        .map_err(|e| AppError::processing(IMAGE_PROCESSING, e))?;

    tracing::info!(
        "Successfully extracted text from image: {} chars",
        text.chars().count()
    );
    Ok(text)
}

fn text_download(file: &UploadedAsset, text: String) -> Response {
    let filename = format!("{}_extracted.txt", file.download_stem());
    attachment(text, TEXT_PLAIN_UTF8, &filename)
}

/// `POST /ocr`
#[utoipa::path(
    post,
    path = "/ocr",
    tag = "ocr",
    request_body(content_type = "multipart/form-data", content = String, description = "Image upload in the `file` field"),
    responses(
        (status = 200, description = "Extracted text as a download", content_type = "text/plain", body = String),
        (status = 400, description = "Unsupported file type", body = ErrorBody),
        (status = 413, description = "File too large", body = ErrorBody),
        (status = 422, description = "Missing file", body = ErrorBody),
        (status = 500, description = "Image could not be processed", body = ErrorBody),
    )
)]
pub async fn extract_text(State(state): State<AppState>, form: UploadForm) -> Result<Response> {
    let text = extract(&state, &form.file, DEFAULT_PROMPT).await?;
    Ok(text_download(&form.file, text))
}

/// `POST /ocr-with-prompt`
///
/// Same as `/ocr` but the caller chooses the instruction.
#[utoipa::path(
    post,
    path = "/ocr-with-prompt",
    tag = "ocr",
    params(OcrQuery),
    request_body(content_type = "multipart/form-data", content = String, description = "Image upload in the `file` field with an optional `prompt` field"),
    responses(
        (status = 200, description = "Extracted text as a download", content_type = "text/plain", body = String),
        (status = 400, description = "Unsupported file type", body = ErrorBody),
        (status = 413, description = "File too large", body = ErrorBody),
        (status = 422, description = "Missing file", body = ErrorBody),
        (status = 500, description = "Image could not be processed", body = ErrorBody),
    )
)]
pub async fn extract_text_with_prompt(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<OcrQuery>,
    form: UploadForm,
) -> Result<Response> {
    let prompt = form
        .field("prompt")
        .or_else(|| query.prompt())
        .unwrap_or(DEFAULT_CUSTOM_PROMPT);

    let text = extract(&state, &form.file, prompt).await?;
    Ok(text_download(&form.file, text))
}

/// `POST /ocr-audio`
///
/// Extracts text and reads it aloud. Synthesis is skipped when the image has no text.
#[utoipa::path(
    post,
    path = "/ocr-audio",
    tag = "ocr",
    params(OcrQuery),
    request_body(content_type = "multipart/form-data", content = String, description = "Image upload in the `file` field with an optional `lang` field"),
    responses(
        (status = 200, description = "Spoken text as an MP3 download", content_type = "audio/mpeg", body = Vec<u8>),
        (status = 400, description = "Unsupported file type", body = ErrorBody),
        (status = 413, description = "File too large", body = ErrorBody),
        (status = 422, description = "Missing file or no text found", body = ErrorBody),
        (status = 500, description = "Image or audio could not be processed", body = ErrorBody),
    )
)]
pub async fn extract_text_as_audio(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<OcrQuery>,
    form: UploadForm,
) -> Result<Response> {
    let lang = form
        .field("lang")
        .or_else(|| query.lang())
        .unwrap_or(DEFAULT_LANGUAGE);

    let text = extract(&state, &form.file, DEFAULT_PROMPT).await?;
    if text.trim().is_empty() {
        return Err(AppError::NoTextFound);
    }

    let request =
        SynthesisRequest::new(text, lang).map_err(|e| AppError::processing(IMAGE_PROCESSING, e))?;
    let audio = state
        .synthesizer
        .synthesize(&request)
        .await
        .map_err(|e| AppError::processing(IMAGE_PROCESSING, e))?;

    tracing::info!(
        "Successfully converted text to audio: {} bytes, lang={}",
        audio.len(),
        request.language()
    );

    let filename = format!("{}_audio.mp3", form.file.download_stem());
    Ok(attachment(audio, AUDIO_MPEG, &filename))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_query_values_are_ignored() {
        let query = OcrQuery {
            prompt: Some("  ".into()),
            lang: Some("fr".into()),
        };
        assert_eq!(query.prompt(), None);
        assert_eq!(query.lang(), Some("fr"));
        assert_eq!(OcrQuery::default().lang(), None);
    }
}
