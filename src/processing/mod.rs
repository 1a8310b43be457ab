pub mod annotate;
pub mod confidence;
pub mod preprocessing;
pub mod quality;
pub mod steps;

pub use quality::QualityAssessor;
pub use steps::{PreprocessStep, Preprocessor};
