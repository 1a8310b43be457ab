use image::{DynamicImage, GrayImage};
use tracing::{debug, info};

use crate::config::PreprocessConfig;
use crate::error::Result;
use crate::pipeline::DebugConfig;
use crate::processing::preprocessing;

/// One grayscale-to-grayscale preprocessing transform
pub trait PreprocessStep: Send + Sync {
    fn apply(&self, image: &GrayImage) -> Result<GrayImage>;

    /// Human-readable name (used in logs and debug folder names)
    fn name(&self) -> &str;
}

/// Edge-preserving denoise
pub struct BilateralDenoiseStep {
    pub diameter: u32,
    pub sigma_color: f32,
    pub sigma_space: f32,
}

impl PreprocessStep for BilateralDenoiseStep {
    fn apply(&self, image: &GrayImage) -> Result<GrayImage> {
        preprocessing::bilateral_denoise(image, self.diameter, self.sigma_color, self.sigma_space)
    }

    fn name(&self) -> &str {
        "Bilateral Denoise"
    }
}

/// Dilate then erode with a square kernel
pub struct MorphologicalCloseStep {
    pub kernel: u32,
}

impl PreprocessStep for MorphologicalCloseStep {
    fn apply(&self, image: &GrayImage) -> Result<GrayImage> {
        preprocessing::close(image, self.kernel)
    }

    fn name(&self) -> &str {
        "Morphological Close"
    }
}

/// Gaussian-mean local binarization
pub struct AdaptiveThresholdStep {
    pub block_size: u32,
    pub offset: i32,
}

impl PreprocessStep for AdaptiveThresholdStep {
    fn apply(&self, image: &GrayImage) -> Result<GrayImage> {
        preprocessing::adaptive_threshold_gaussian(image, self.block_size, self.offset)
    }

    fn name(&self) -> &str {
        "Adaptive Threshold"
    }
}

/// Grayscale conversion followed by a chain of steps
pub struct Preprocessor {
    steps: Vec<Box<dyn PreprocessStep>>,
}

impl Preprocessor {
    /// Create a preprocessor with no steps after grayscale conversion
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Denoise, optional closing, then binarize
    pub fn from_config(config: &PreprocessConfig) -> Self {
        let mut preprocessor = Self::new().add_step(Box::new(BilateralDenoiseStep {
            diameter: config.bilateral_diameter,
            sigma_color: config.sigma_color,
            sigma_space: config.sigma_space,
        }));

        if config.apply_closing {
            preprocessor = preprocessor.add_step(Box::new(MorphologicalCloseStep {
                kernel: config.closing_kernel,
            }));
        }

        preprocessor.add_step(Box::new(AdaptiveThresholdStep {
            block_size: config.threshold_block_size,
            offset: config.threshold_offset,
        }))
    }

    pub fn add_step(mut self, step: Box<dyn PreprocessStep>) -> Self {
        self.steps.push(step);
        self
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Run every step in order. Output keeps the input dimensions.
    pub fn preprocess(&self, image: &DynamicImage) -> Result<GrayImage> {
        self.preprocess_with_debug(image, None)
    }

    /// Like `preprocess`, also dumping each stage when debug output is on.
    /// Stage folders are numbered from `first_index`.
    pub fn preprocess_with_debug(
        &self,
        image: &DynamicImage,
        debug: Option<(&DebugConfig, usize)>,
    ) -> Result<GrayImage> {
        info!("Preprocessing image {}x{}", image.width(), image.height());

        let mut current = preprocessing::to_grayscale(image);
        if let Some((config, first_index)) = debug {
            config.save_stage(first_index, "Grayscale", &current)?;
        }

        for (idx, step) in self.steps.iter().enumerate() {
            debug!("Running step: {}", step.name());
            current = step.apply(&current)?;

            if let Some((config, first_index)) = debug {
                config.save_stage(first_index + idx + 1, step.name(), &current)?;
            }
        }

        info!("Image preprocessing completed successfully");
        Ok(current)
    }
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::from_config(&PreprocessConfig::default())
    }
}
