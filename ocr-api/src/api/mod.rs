mod extractors;
pub mod handlers;
mod openapi;
mod response;
mod routes;
mod state;

pub use extractors::{FormFields, QueryParams, UploadForm};
pub use openapi::ApiDoc;
pub use response::{attachment, ErrorBody, AUDIO_MPEG, TEXT_PLAIN_UTF8};
pub use routes::{body_limit, cors_layer, create_router};
pub use state::AppState;
