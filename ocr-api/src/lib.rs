//! Image-to-text and text-to-speech HTTP service.
//!
//! An uploaded image is validated, sent to Gemini for text extraction and
//! returned as a text download, or read aloud through a text-to-speech
//! service and returned as MP3. Nothing is persisted between requests.

pub mod api;
pub mod config;
pub mod error;
pub mod extraction;
pub mod gateway;
pub mod logging;
pub mod speech;
pub mod upload;
