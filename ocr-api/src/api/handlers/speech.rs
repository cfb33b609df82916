use axum::extract::State;
use axum::response::Response;
use serde::Deserialize;

use crate::api::extractors::{FormFields, QueryParams};
use crate::api::response::{attachment, ErrorBody, AUDIO_MPEG};
use crate::api::state::AppState;
use crate::error::{AppError, Result};
use crate::speech::{SynthesisRequest, DEFAULT_LANGUAGE};

const DOWNLOAD_NAME: &str = "text_audio.mp3";

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SpeechQuery {
    /// Speech language code, used when the form has no `lang` field.
    pub lang: Option<String>,
}

/// `POST /text-to-audio`
///
/// Accepts `text` and optional `lang` as url-encoded or multipart form fields.
#[utoipa::path(
    post,
    path = "/text-to-audio",
    tag = "speech",
    params(SpeechQuery),
    request_body(content_type = "application/x-www-form-urlencoded", content = String, description = "`text` to speak and optional `lang` (default `en`)"),
    responses(
        (status = 200, description = "MP3 download", content_type = "audio/mpeg", body = Vec<u8>),
        (status = 400, description = "Text is empty", body = ErrorBody),
        (status = 422, description = "Missing text field", body = ErrorBody),
        (status = 500, description = "Audio could not be produced", body = ErrorBody),
    )
)]
pub async fn text_to_audio(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<SpeechQuery>,
    fields: FormFields,
) -> Result<Response> {
    let text = fields.get("text").ok_or(AppError::MissingField("text"))?;
    let lang = fields
        .non_blank("lang")
        .or_else(|| query.lang.as_deref().filter(|l| !l.trim().is_empty()))
        .unwrap_or(DEFAULT_LANGUAGE);

    tracing::info!(
        "Processing text-to-audio request: {} chars, lang={}",
        text.chars().count(),
        lang
    );

    let request = SynthesisRequest::new(text, lang).map_err(AppError::from_speech)?;
    let audio = state
        .synthesizer
        .synthesize(&request)
        .await
        .map_err(|e| AppError::from_speech(e.into()))?;

    tracing::info!("Successfully converted text to audio: {} bytes", audio.len());
    Ok(attachment(audio, AUDIO_MPEG, DOWNLOAD_NAME))
}
