pub mod health;
pub mod ocr;
pub mod speech;

pub use health::{health_check, root};
pub use ocr::{extract_text, extract_text_as_audio, extract_text_with_prompt};
pub use speech::text_to_audio;
