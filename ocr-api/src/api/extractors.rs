use std::collections::HashMap;

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::{FormRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, Multipart, Query, Request};
use axum::http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::Form;
use serde::de::DeserializeOwned;

use super::routes::body_limit;
use super::state::AppState;
use crate::error::AppError;
use crate::upload::UploadedAsset;

const FILE_FIELD: &str = "file";

/// Multipart body with a required `file` part and any number of text fields.
#[derive(Debug)]
pub struct UploadForm {
    pub file: UploadedAsset,
    pub fields: HashMap<String, String>,
}

impl UploadForm {
    /// Text field value, `None` when absent or blank.
    pub fn field(&self, name: &str) -> Option<&str> {
        non_blank(self.fields.get(name))
    }

    async fn read<S>(req: Request, state: &S) -> Result<Self, AppError>
    where
        S: Send + Sync,
    {
        let mut multipart = Multipart::from_request(req, state).await?;
        let mut file: Option<UploadedAsset> = None;
        let mut fields = HashMap::new();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or("").to_string();

            if name == FILE_FIELD {
                let filename = field.file_name().map(str::to_string);
                let content_type = field.content_type().unwrap_or("").to_string();
                let bytes = field.bytes().await?;

                file = Some(UploadedAsset {
                    bytes,
                    content_type,
                    filename,
                });
            } else if !name.is_empty() {
                let value = field.text().await?;
                fields.insert(name, value);
            }
        }

        let file = file.ok_or(AppError::MissingField(FILE_FIELD))?;
        Ok(Self { file, fields })
    }
}

impl FromRequest<AppState> for UploadForm {
    type Rejection = AppError;

    /// A body cut off at the request limit is reported like any other oversized upload.
    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let declared_len = req
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<usize>().ok());

        match Self::read(req, state).await {
            Err(AppError::Form { status, .. }) if status == StatusCode::PAYLOAD_TOO_LARGE => {
                let size = declared_len.unwrap_or_else(|| body_limit(&state.config.upload));
                Err(state.validator.too_large(size).into())
            }
            other => other,
        }
    }
}

/// [`Query`] whose rejection renders as an [`AppError`].
#[derive(Debug, Clone, Default)]
pub struct QueryParams<T>(pub T);

impl<T, S> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

/// Text fields from either `application/x-www-form-urlencoded` or `multipart/form-data`.
#[derive(Debug, Default)]
pub struct FormFields(pub HashMap<String, String>);

impl FormFields {
    /// Raw value, including empty strings.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Value when present and not blank.
    pub fn non_blank(&self, name: &str) -> Option<&str> {
        non_blank(self.0.get(name))
    }
}

impl<S> FromRequest<S> for FormFields
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.trim_start().to_lowercase().starts_with("multipart/form-data"))
            .unwrap_or(false);

        if !is_multipart {
            let Form(fields) = Form::<HashMap<String, String>>::from_request(req, state).await?;
            return Ok(Self(fields));
        }

        let mut multipart = Multipart::from_request(req, state).await?;
        let mut fields = HashMap::new();
        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            let value = field.text().await?;
            fields.insert(name, value);
        }

        Ok(Self(fields))
    }
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|v| !v.trim().is_empty())
}

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        AppError::Form {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        AppError::Form {
            status: err.status(),
            message: err.body_text(),
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Form {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<FormRejection> for AppError {
    fn from(rejection: FormRejection) -> Self {
        AppError::Form {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}
