use base64::{engine::general_purpose::STANDARD, Engine};
use serde::Serialize;

/// A corner of a detection polygon, in pixel coordinates of the image the
/// recognizer was given
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// One recognized text region
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Detection {
    /// Four corners, in drawing order
    pub region: [Point; 4],
    pub text: String,
    /// `None` when the engine did not report a score. Kept distinct from 0.0.
    pub confidence: Option<f32>,
}

impl Detection {
    pub fn new(region: [Point; 4], text: impl Into<String>, confidence: Option<f32>) -> Self {
        Self {
            region,
            text: text.into(),
            confidence,
        }
    }

    /// Build a detection from an axis-aligned box
    pub fn from_rect(
        left: f32,
        top: f32,
        right: f32,
        bottom: f32,
        text: impl Into<String>,
        confidence: Option<f32>,
    ) -> Self {
        Self::new(
            [
                Point::new(left, top),
                Point::new(right, top),
                Point::new(right, bottom),
                Point::new(left, bottom),
            ],
            text,
            confidence,
        )
    }
}

/// Advisory sharpness verdict. Never blocks the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityReport {
    pub acceptable: bool,
    pub message: String,
    pub metric: f64,
}

impl QualityReport {
    pub const ACCEPTABLE: &'static str = "Image quality is acceptable.";
    pub const BLURRY: &'static str = "Image is blurry; consider re-uploading.";
    pub const PIPELINE_ERROR: &'static str = "Error during quality check";

    /// Report attached to error envelopes
    pub fn pipeline_error() -> Self {
        Self {
            acceptable: false,
            message: Self::PIPELINE_ERROR.to_string(),
            metric: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    Success,
    Error,
}

/// Final output of one pipeline run
#[derive(Debug, Clone)]
pub struct DocumentResult {
    pub status: DocumentStatus,
    pub extracted_text: String,
    /// PNG bytes, absent when nothing was detected or the run failed
    pub annotated_image: Option<Vec<u8>>,
    pub confidence: f64,
    pub word_count: usize,
    pub character_count: usize,
    pub num_detections: usize,
    pub quality: QualityReport,
    pub error: Option<String>,
    pub detections: Vec<Detection>,
}

impl DocumentResult {
    /// Success envelope; counts are derived from the joined text
    pub fn success(
        detections: Vec<Detection>,
        extracted_text: String,
        confidence: f64,
        annotated_image: Option<Vec<u8>>,
        quality: QualityReport,
    ) -> Self {
        Self {
            status: DocumentStatus::Success,
            word_count: extracted_text.split_whitespace().count(),
            character_count: extracted_text.chars().count(),
            num_detections: detections.len(),
            extracted_text,
            annotated_image,
            confidence,
            quality,
            error: None,
            detections,
        }
    }

    /// Valid "no text found" outcome
    pub fn empty(quality: QualityReport) -> Self {
        Self::success(Vec::new(), String::new(), 0.0, None, quality)
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            status: DocumentStatus::Error,
            extracted_text: String::new(),
            annotated_image: None,
            confidence: 0.0,
            word_count: 0,
            character_count: 0,
            num_detections: 0,
            quality: QualityReport::pipeline_error(),
            error: Some(message.into()),
            detections: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == DocumentStatus::Success
    }

    /// Transport form of this result
    pub fn to_response(&self, include_detections: bool) -> DocumentResponse {
        match self.status {
            DocumentStatus::Success => DocumentResponse::Success {
                extracted_text: self.extracted_text.clone(),
                extracted_image: self
                    .annotated_image
                    .as_ref()
                    .map(|bytes| STANDARD.encode(bytes))
                    .unwrap_or_default(),
                confidence: self.confidence,
                word_count: self.word_count,
                character_count: self.character_count,
                num_detections: self.num_detections,
                quality_check: self.quality.message.clone(),
                detections: include_detections.then(|| self.detections.clone()),
            },
            DocumentStatus::Error => DocumentResponse::Error {
                error: self.error.clone().unwrap_or_default(),
                confidence: 0.0,
                quality_check: self.quality.message.clone(),
            },
        }
    }
}

/// Serialized envelope handed to the transport layer
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum DocumentResponse {
    Success {
        extracted_text: String,
        /// Base64 PNG, empty string when nothing was detected
        extracted_image: String,
        confidence: f64,
        word_count: usize,
        character_count: usize,
        num_detections: usize,
        quality_check: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        detections: Option<Vec<Detection>>,
    },
    Error {
        error: String,
        confidence: f64,
        quality_check: String,
    },
}
