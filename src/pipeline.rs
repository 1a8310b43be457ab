use image::{DynamicImage, GrayImage};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, info_span, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::error::{PipelineError, Result};
use crate::models::{Detection, DocumentResult};
use crate::processing::annotate::{annotate, encode_png};
use crate::processing::preprocessing::resize_to_fit;
use crate::processing::{confidence, QualityAssessor, Preprocessor};
use crate::recognition::SharedRecognizer;

/// Debug configuration for pipeline execution
#[derive(Clone, Debug)]
pub struct DebugConfig {
    /// Root directory for debug outputs
    pub output_dir: PathBuf,
}

impl DebugConfig {
    /// The directory must be empty or non-existent
    pub fn new(output_dir: PathBuf) -> anyhow::Result<Self> {
        if output_dir.exists() {
            let entries = std::fs::read_dir(&output_dir)?;
            if entries.count() > 0 {
                anyhow::bail!("Debug directory is not empty: {}", output_dir.display());
            }
        } else {
            std::fs::create_dir_all(&output_dir)?;
        }
        Ok(Self { output_dir })
    }

    /// Folder name for a stage, e.g. "03_bilateral_denoise"
    pub fn stage_dir_name(index: usize, name: &str) -> String {
        format!("{:02}_{}", index, name.to_lowercase().replace(' ', "_"))
    }

    /// Save one stage image as `<index>_<name>/01.png`
    pub fn save_stage(&self, index: usize, name: &str, image: &GrayImage) -> Result<()> {
        self.save_dynamic(index, name, &DynamicImage::ImageLuma8(image.clone()))
    }

    pub fn save_dynamic(&self, index: usize, name: &str, image: &DynamicImage) -> Result<()> {
        let step_dir = self.output_dir.join(Self::stage_dir_name(index, name));
        std::fs::create_dir_all(&step_dir).map_err(|e| PipelineError::Debug(e.to_string()))?;
        let output_path = step_dir.join("01.png");
        image
            .save(&output_path)
            .map_err(|e| PipelineError::Debug(e.to_string()))?;
        info!("Debug: saved {}", output_path.display());
        Ok(())
    }
}

/// Everything produced by a successful run before it is folded into a result
struct Recognized {
    detections: Vec<Detection>,
    working_image: DynamicImage,
}

/// Orchestrates quality check, resize, preprocessing, recognition,
/// aggregation and annotation for one document at a time.
///
/// Cloning is cheap; clones share the same recognizer.
#[derive(Clone)]
pub struct DocumentPipeline {
    recognizer: SharedRecognizer,
    assessor: QualityAssessor,
    preprocessor: Arc<Preprocessor>,
    max_dimension: u32,
    debug: Option<DebugConfig>,
}

impl DocumentPipeline {
    pub fn new(recognizer: SharedRecognizer, config: Config) -> Self {
        Self {
            recognizer,
            assessor: QualityAssessor::new(config.quality.blur_threshold),
            preprocessor: Arc::new(Preprocessor::from_config(&config.preprocess)),
            max_dimension: config.pipeline.max_dimension,
            debug: None,
        }
    }

    /// Enable debug mode with output directory
    pub fn with_debug(mut self, output_dir: PathBuf) -> anyhow::Result<Self> {
        self.debug = Some(DebugConfig::new(output_dir)?);
        Ok(self)
    }

    /// Replace the preprocessing chain built from the config
    pub fn with_preprocessor(mut self, preprocessor: Preprocessor) -> Self {
        self.preprocessor = Arc::new(preprocessor);
        self
    }

    /// Process raw image bytes. Never fails: errors come back as an error envelope.
    pub fn run(&self, bytes: &[u8]) -> DocumentResult {
        let span = info_span!("document", request_id = %Uuid::new_v4());
        let _guard = span.enter();

        match self.process(bytes) {
            Ok(result) => result,
            Err(e) => {
                error!("Error processing document: {}", e);
                DocumentResult::failure(e.to_string())
            }
        }
    }

    /// Process an already decoded image
    pub fn run_image(&self, image: DynamicImage) -> DocumentResult {
        let span = info_span!("document", request_id = %Uuid::new_v4());
        let _guard = span.enter();

        match self.process_image(image) {
            Ok(result) => result,
            Err(e) => {
                error!("Error processing document: {}", e);
                DocumentResult::failure(e.to_string())
            }
        }
    }

    fn process(&self, bytes: &[u8]) -> Result<DocumentResult> {
        if bytes.is_empty() {
            return Err(PipelineError::Decode("no image data provided".to_string()));
        }
        let image = image::load_from_memory(bytes)?;
        if image.width() == 0 || image.height() == 0 {
            return Err(PipelineError::Decode(format!(
                "image has zero width or height ({}x{})",
                image.width(),
                image.height()
            )));
        }
        self.process_image(image)
    }

    fn process_image(&self, image: DynamicImage) -> Result<DocumentResult> {
        if let Some(debug) = &self.debug {
            debug.save_dynamic(0, "Input", &image)?;
        }

        let quality = self.assessor.assess(&image);
        info!("Image quality check: {}", quality.message);

        let Recognized {
            detections,
            working_image,
        } = self.recognize(image)?;

        if detections.is_empty() {
            warn!("No text detected in the image");
            return Ok(DocumentResult::empty(quality));
        }

        let extracted_text = detections
            .iter()
            .map(|d| d.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let confidence = confidence::aggregate(&detections);

        let annotated = annotate(&working_image, &detections);
        if let Some(debug) = &self.debug {
            let index = self.preprocessor.step_names().len() + 3;
            debug.save_dynamic(index, "Annotated", &DynamicImage::ImageRgb8(annotated.clone()))?;
        }
        let png = encode_png(&annotated)?;

        let result = DocumentResult::success(
            detections,
            extracted_text,
            confidence,
            Some(png),
            quality,
        );
        info!(
            "Processing completed successfully. Detections: {}, confidence: {:.4}",
            result.num_detections, result.confidence
        );
        Ok(result)
    }

    /// Resize, preprocess and recognize. Returns the resized colour image
    /// alongside the detections so annotation happens in the same coordinates.
    fn recognize(&self, image: DynamicImage) -> Result<Recognized> {
        info!("Original image dimensions: {}x{}", image.width(), image.height());
        let (working_image, scale) = resize_to_fit(image, self.max_dimension);
        if let Some(scale) = scale {
            info!(
                "Resized image to scale: {:.4} ({}x{})",
                scale,
                working_image.width(),
                working_image.height()
            );
            if let Some(debug) = &self.debug {
                debug.save_dynamic(1, "Resized", &working_image)?;
            }
        }

        let processed = self
            .preprocessor
            .preprocess_with_debug(&working_image, self.debug.as_ref().map(|d| (d, 2)))?;

        info!("Starting OCR processing");
        let detections = self.recognizer.recognize(&processed)?;
        info!("OCR completed. Found {} text regions", detections.len());
        for (idx, detection) in detections.iter().enumerate() {
            match detection.confidence {
                Some(c) => info!("Region {}: Text='{}', Confidence={}", idx, detection.text, c),
                None => info!("Region {}: Text='{}', Confidence=N/A", idx, detection.text),
            }
        }

        Ok(Recognized {
            detections,
            working_image,
        })
    }
}
