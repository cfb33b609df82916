use axum::Json;
use utoipa::OpenApi;
use utoipa_redoc::{Redoc, Servable};

use super::handlers;
use super::response;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "OCR API",
        version = "1.0.0",
        description = "Extract text from images with Gemini and turn text into speech.",
    ),
    paths(
        handlers::health::root,
        handlers::health::health_check,
        handlers::ocr::extract_text,
        handlers::ocr::extract_text_with_prompt,
        handlers::ocr::extract_text_as_audio,
        handlers::speech::text_to_audio,
    ),
    components(schemas(
        response::ErrorBody,
        handlers::health::ServiceInfo,
        handlers::health::HealthStatus,
    )),
    tags(
        (name = "health", description = "Liveness and service info"),
        (name = "ocr", description = "Text extraction from uploaded images"),
        (name = "speech", description = "Text-to-speech conversion"),
    ),
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn redoc_router<S: Clone + Send + Sync + 'static>() -> axum::Router<S> {
    Redoc::with_url("/docs", ApiDoc::openapi()).into()
}
