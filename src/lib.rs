pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod processing;
pub mod recognition;
pub mod upload;

pub use config::Config;
pub use error::PipelineError;
pub use models::{
    Detection, DocumentResponse, DocumentResult, DocumentStatus, Point, QualityReport,
};
pub use pipeline::{DebugConfig, DocumentPipeline};
pub use processing::{PreprocessStep, Preprocessor, QualityAssessor};
pub use recognition::{OcrsRecognizer, SharedRecognizer, TextRecognizer};
