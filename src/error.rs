//! Error types for the document pipeline

use thiserror::Error;

/// Pipeline result type
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Fatal failures inside a pipeline run.
///
/// None of these escape `DocumentPipeline::run`; they are folded into the
/// error envelope of the returned `DocumentResult`.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Unable to decode image: {0}")]
    Decode(String),

    #[error("Preprocessing failed: {0}")]
    Preprocessing(String),

    #[error("Text recognition failed: {0}")]
    Recognition(String),

    #[error("Failed to encode image: {0}")]
    Encoding(String),

    #[error("Failed to write debug output: {0}")]
    Debug(String),
}

impl From<image::ImageError> for PipelineError {
    fn from(e: image::ImageError) -> Self {
        PipelineError::Decode(e.to_string())
    }
}
