//! Upload validation: content-type allow-list, size ceiling, image sanity check
//! and the stem used for download filenames.

use axum::body::Bytes;
use image::{ImageError, ImageReader};
use std::io::Cursor;
use thiserror::Error;

use crate::config::UploadConfig;

/// A file received in a multipart request. Lives for one request only.
#[derive(Debug, Clone)]
pub struct UploadedAsset {
    pub bytes: Bytes,
    /// Declared MIME type; empty when the part carried none.
    pub content_type: String,
    pub filename: Option<String>,
}

impl UploadedAsset {
    pub fn display_name(&self) -> &str {
        self.filename.as_deref().unwrap_or("<unnamed>")
    }

    pub fn download_stem(&self) -> String {
        download_stem(self.filename.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Invalid file type. Allowed: {}", .allowed.join(", "))]
    UnsupportedType {
        content_type: String,
        allowed: Vec<String>,
    },

    #[error("File too large. Maximum size is {limit_mb:.2}MB")]
    TooLarge {
        size: usize,
        limit: i64,
        limit_mb: f64,
    },
}

/// Pure check of a declared content type and byte length against the upload policy.
#[derive(Debug, Clone)]
pub struct UploadValidator {
    policy: UploadConfig,
}

impl UploadValidator {
    pub fn new(policy: &UploadConfig) -> Self {
        Self {
            policy: policy.clone(),
        }
    }

    /// Type is checked before size.
    pub fn validate(&self, content_type: &str, byte_len: usize) -> Result<(), ValidationError> {
        if !self.policy.is_content_type_allowed(content_type) {
            tracing::warn!("Invalid file type: {}", content_type);
            return Err(ValidationError::UnsupportedType {
                content_type: content_type.to_string(),
                allowed: self.policy.allowed_content_types.clone(),
            });
        }

        let too_large = i64::try_from(byte_len)
            .map(|len| len > self.policy.max_file_size)
            .unwrap_or(true);
        if too_large {
            return Err(self.too_large(byte_len));
        }

        Ok(())
    }

    /// Rejection for an upload of `size` bytes. Also used when the body was cut
    /// off before the file could be read in full.
    pub fn too_large(&self, size: usize) -> ValidationError {
        tracing::warn!(
            "File too large: {} bytes (max: {})",
            size,
            self.policy.max_file_size
        );
        ValidationError::TooLarge {
            size,
            limit: self.policy.max_file_size,
            limit_mb: self.policy.max_file_size_mb(),
        }
    }

    pub fn validate_asset(&self, asset: &UploadedAsset) -> Result<(), ValidationError> {
        self.validate(&asset.content_type, asset.bytes.len())
    }
}

/// Confirms the bytes start with a recognisable image header and returns its dimensions.
///
/// Only the header is read; pixel data is not decoded.
pub fn verify_image(bytes: &[u8]) -> Result<(u32, u32), ImageError> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .into_dimensions()
}

/// Filename without its final extension, safe to embed in a `Content-Disposition` header.
///
/// Falls back to `image` when no usable name was supplied.
pub fn download_stem(filename: Option<&str>) -> String {
    let name = filename
        .unwrap_or("")
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or("");
    let name: String = name
        .chars()
        .filter(|c| *c != '"' && !c.is_control())
        .collect();

    let stem = match name.rfind('.') {
        Some(idx) if !name[..idx].trim_start_matches('.').is_empty() => &name[..idx],
        _ => name.as_str(),
    };

    let stem = stem.trim();
    if stem.is_empty() {
        "image".to_string()
    } else {
        stem.to_string()
    }
}
