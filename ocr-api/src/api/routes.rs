use axum::body::Body;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderName, HeaderValue, Method, Request};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use super::handlers;
use super::openapi;
use super::AppState;
use crate::config::{CorsConfig, UploadConfig};

const MULTIPART_OVERHEAD: usize = 1024 * 1024;
const WILDCARD: &str = "*";

pub fn create_router(state: AppState) -> Router {
    let limit = body_limit(&state.config.upload);
    let cors = cors_layer(&state.config.cors);

    let mut router = Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        .route("/ocr", post(handlers::extract_text))
        .route("/ocr-with-prompt", post(handlers::extract_text_with_prompt))
        .route("/ocr-audio", post(handlers::extract_text_as_audio))
        .route("/text-to-audio", post(handlers::text_to_audio))
        .route("/openapi.json", get(openapi::openapi_json))
        .merge(openapi::redoc_router())
        .layer(DefaultBodyLimit::max(limit))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    id = %Uuid::new_v4(),
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        );

    if let Some(cors) = cors {
        router = router.layer(cors);
    }

    router.with_state(state)
}

/// Request body ceiling: the upload limit plus room for multipart framing and
/// form fields, so oversized files still reach validation and get a 413 there.
pub fn body_limit(upload: &UploadConfig) -> usize {
    let max = usize::try_from(upload.max_file_size.max(0)).unwrap_or(usize::MAX);
    max.saturating_add(MULTIPART_OVERHEAD)
}

/// `None` when CORS is disabled.
///
/// A `*` entry allows any value. With credentials enabled the wildcard mirrors
/// the request instead, since browsers reject `*` on credentialed responses.
pub fn cors_layer(config: &CorsConfig) -> Option<CorsLayer> {
    if !config.enabled {
        return None;
    }

    let credentials = config.credentials;
    let has_wildcard = |values: &[String]| values.iter().any(|v| v.trim() == WILDCARD);

    let origins = if has_wildcard(&config.origins) {
        if credentials {
            AllowOrigin::mirror_request()
        } else {
            AllowOrigin::from(Any)
        }
    } else {
        AllowOrigin::list(parse_all(&config.origins, "origin", |v| {
            HeaderValue::from_str(v).ok()
        }))
    };

    let methods = if has_wildcard(&config.methods) {
        if credentials {
            AllowMethods::mirror_request()
        } else {
            AllowMethods::from(Any)
        }
    } else {
        AllowMethods::list(parse_all(&config.methods, "method", |v| {
            Method::from_bytes(v.to_uppercase().as_bytes()).ok()
        }))
    };

    let headers = if has_wildcard(&config.headers) {
        if credentials {
            AllowHeaders::mirror_request()
        } else {
            AllowHeaders::from(Any)
        }
    } else {
        AllowHeaders::list(parse_all(&config.headers, "header", |v| {
            HeaderName::from_bytes(v.as_bytes()).ok()
        }))
    };

    Some(
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(headers)
            .allow_credentials(credentials),
    )
}

fn parse_all<T>(values: &[String], kind: &str, parse: impl Fn(&str) -> Option<T>) -> Vec<T> {
    values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .filter_map(|v| {
            let parsed = parse(v);
            if parsed.is_none() {
                tracing::warn!("Ignoring invalid CORS {}: {}", kind, v);
            }
            parsed
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_body_limit_leaves_room_for_framing() {
        let mut upload = Config::default().upload;
        assert_eq!(body_limit(&upload), 21 * 1024 * 1024);

        upload.max_file_size = -5;
        assert_eq!(body_limit(&upload), MULTIPART_OVERHEAD);

        upload.max_file_size = i64::MAX;
        assert!(body_limit(&upload) >= MULTIPART_OVERHEAD);
    }

    #[test]
    fn test_cors_disabled() {
        let mut cors = Config::default().cors;
        cors.enabled = false;
        assert!(cors_layer(&cors).is_none());
    }

    #[test]
    fn test_cors_variants_build() {
        let mut cors = Config::default().cors;
        assert!(cors_layer(&cors).is_some());

        cors.credentials = true;
        assert!(cors_layer(&cors).is_some());

        cors.origins = vec!["https://app.example".into(), "not a\nvalid origin".into()];
        cors.methods = vec!["get".into(), "POST".into()];
        cors.headers = vec!["content-type".into(), "bad header".into()];
        assert!(cors_layer(&cors).is_some());
    }

    #[test]
    fn test_parse_all_skips_invalid_entries() {
        let parsed = parse_all(
            &["GET".into(), " ".into(), "BAD METHOD".into()],
            "method",
            |v| Method::from_bytes(v.as_bytes()).ok(),
        );
        assert_eq!(parsed, vec![Method::GET]);
    }
}
