use image::{DynamicImage, GrayImage};
use ocrs::{ImageSource, OcrEngine, OcrEngineParams};
use rten::Model;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{PipelineError, Result};
use crate::models::Detection;
use crate::recognition::TextRecognizer;

pub const DETECTION_MODEL: &str = "text-detection.rten";
pub const RECOGNITION_MODEL: &str = "text-recognition.rten";

/// Standard cache location for ocrs models
pub fn default_model_dir() -> anyhow::Result<PathBuf> {
    let home_dir = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE"))?;
    Ok(Path::new(&home_dir).join(".cache/ocrs"))
}

/// Text recognizer backed by the ocrs engine.
///
/// ocrs does not report per-line scores, so every detection carries
/// `confidence: None`.
pub struct OcrsRecognizer {
    engine: OcrEngine,
}

impl OcrsRecognizer {
    /// Load detection and recognition models from `model_dir`, or the
    /// standard cache location when `None`
    pub fn load(model_dir: Option<&Path>) -> anyhow::Result<Self> {
        let cache_dir = match model_dir {
            Some(dir) => dir.to_path_buf(),
            None => default_model_dir()?,
        };
        let detection_model_path = cache_dir.join(DETECTION_MODEL);
        let recognition_model_path = cache_dir.join(RECOGNITION_MODEL);

        if !detection_model_path.exists() || !recognition_model_path.exists() {
            anyhow::bail!(
                "OCR models not found. Please run: ocrs-cli --help (or download models manually)\n\
                 Expected locations:\n  - {}\n  - {}",
                detection_model_path.display(),
                recognition_model_path.display()
            );
        }

        let detection_model = Model::load_file(&detection_model_path)?;
        let recognition_model = Model::load_file(&recognition_model_path)?;

        let engine = OcrEngine::new(OcrEngineParams {
            detection_model: Some(detection_model),
            recognition_model: Some(recognition_model),
            ..Default::default()
        })?;

        info!("OCR engine initialized from {}", cache_dir.display());
        Ok(Self { engine })
    }
}

fn recognition_error(e: impl std::fmt::Display) -> PipelineError {
    PipelineError::Recognition(e.to_string())
}

impl TextRecognizer for OcrsRecognizer {
    fn name(&self) -> &str {
        "ocrs"
    }

    fn recognize(&self, image: &GrayImage) -> Result<Vec<Detection>> {
        let rgb = DynamicImage::ImageLuma8(image.clone()).to_rgb8();

        let source = ImageSource::from_bytes(rgb.as_raw(), rgb.dimensions())
            .map_err(recognition_error)?;
        let input = self.engine.prepare_input(source).map_err(recognition_error)?;

        let words = self.engine.detect_words(&input).map_err(recognition_error)?;
        let lines = self.engine.find_text_lines(&input, &words);
        let texts = self
            .engine
            .recognize_text(&input, &lines)
            .map_err(recognition_error)?;

        let mut detections = Vec::new();
        for (word_rects, line) in lines.iter().zip(texts) {
            let Some(line) = line else {
                continue;
            };

            // Axis-aligned hull of the line's word boxes
            let corners = word_rects.iter().flat_map(|rect| rect.corners());
            let (mut left, mut top) = (f32::MAX, f32::MAX);
            let (mut right, mut bottom) = (f32::MIN, f32::MIN);
            for corner in corners {
                left = left.min(corner.x);
                top = top.min(corner.y);
                right = right.max(corner.x);
                bottom = bottom.max(corner.y);
            }
            if left > right || top > bottom {
                continue;
            }

            detections.push(Detection::from_rect(
                left,
                top,
                right,
                bottom,
                line.to_string(),
                None,
            ));
        }

        Ok(detections)
    }
}
