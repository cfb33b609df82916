use axum::body::Body;
use axum::http::{header, HeaderValue};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

pub const TEXT_PLAIN_UTF8: &str = "text/plain; charset=utf-8";
pub const AUDIO_MPEG: &str = "audio/mpeg";

/// Error payload returned by every failing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Human-readable cause. Never contains internal traces or credentials.
    pub detail: String,
    /// HTTP status code, repeated for clients that only see the body.
    pub code: u16,
}

/// Downloadable response: `Content-Disposition: attachment` with the given filename.
pub fn attachment(body: impl Into<Body>, content_type: &'static str, filename: &str) -> Response {
    (
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(content_type)),
            (header::CONTENT_DISPOSITION, content_disposition(filename)),
        ],
        body.into(),
    )
        .into_response()
}

/// `filename` carries an ASCII fallback; `filename*` carries the exact UTF-8 name when they differ.
fn content_disposition(filename: &str) -> HeaderValue {
    let ascii: String = filename
        .chars()
        .map(|c| {
            if c.is_ascii_graphic() || c == ' ' {
                if c == '"' || c == '\\' {
                    '_'
                } else {
                    c
                }
            } else {
                '_'
            }
        })
        .collect();

    let value = if ascii == filename {
        format!("attachment; filename=\"{ascii}\"")
    } else {
        format!(
            "attachment; filename=\"{ascii}\"; filename*=UTF-8''{}",
            urlencoding::encode(filename)
        )
    };

    HeaderValue::from_str(&value).unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_filename() {
        assert_eq!(
            content_disposition("receipt_extracted.txt"),
            "attachment; filename=\"receipt_extracted.txt\""
        );
    }

    #[test]
    fn test_non_ascii_filename_gets_extended_parameter() {
        assert_eq!(
            content_disposition("café_audio.mp3"),
            "attachment; filename=\"caf__audio.mp3\"; filename*=UTF-8''caf%C3%A9_audio.mp3"
        );
    }

    #[test]
    fn test_attachment_sets_headers() {
        let response = attachment("hello", TEXT_PLAIN_UTF8, "a_extracted.txt");
        let headers = response.headers();
        assert_eq!(headers[header::CONTENT_TYPE], TEXT_PLAIN_UTF8);
        assert_eq!(
            headers[header::CONTENT_DISPOSITION],
            "attachment; filename=\"a_extracted.txt\""
        );
    }
}
