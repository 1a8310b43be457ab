//! Configuration for the document pipeline

use anyhow::Context;
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub quality: QualityConfig,
    pub preprocess: PreprocessConfig,
    pub pipeline: PipelineConfig,
    pub recognition: RecognitionConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    /// Laplacian variance below this is reported as blurry
    pub blur_threshold: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    pub bilateral_diameter: u32,
    pub sigma_color: f32,
    pub sigma_space: f32,
    /// Side of the square structuring element used for closing
    pub closing_kernel: u32,
    /// Feed the dilate-then-erode result into the threshold step
    pub apply_closing: bool,
    /// Neighbourhood side for adaptive thresholding; must be odd
    pub threshold_block_size: u32,
    /// Subtracted from the local mean before comparison
    pub threshold_offset: i32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Images with a larger side are scaled down to this
    pub max_dimension: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RecognitionConfig {
    /// Directory holding text-detection.rten and text-recognition.rten
    pub model_dir: Option<PathBuf>,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            blur_threshold: 100.0,
        }
    }
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            bilateral_diameter: 9,
            sigma_color: 75.0,
            sigma_space: 75.0,
            closing_kernel: 5,
            apply_closing: false,
            threshold_block_size: 199,
            threshold_offset: 5,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_dimension: 2000,
        }
    }
}

impl Config {
    /// Defaults overlaid with `DOCSCAN_*` environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        Self::default().with_env()
    }

    /// Load a JSON config file; missing keys keep their defaults
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Overlay `DOCSCAN_*` environment variables on this config
    pub fn with_env(self) -> anyhow::Result<Self> {
        let mut config = self;

        if let Some(v) = parse_var("DOCSCAN_BLUR_THRESHOLD")? {
            config.quality.blur_threshold = v;
        }
        if let Some(v) = parse_var("DOCSCAN_BILATERAL_DIAMETER")? {
            config.preprocess.bilateral_diameter = v;
        }
        if let Some(v) = parse_var("DOCSCAN_SIGMA_COLOR")? {
            config.preprocess.sigma_color = v;
        }
        if let Some(v) = parse_var("DOCSCAN_SIGMA_SPACE")? {
            config.preprocess.sigma_space = v;
        }
        if let Some(v) = parse_var("DOCSCAN_CLOSING_KERNEL")? {
            config.preprocess.closing_kernel = v;
        }
        if let Some(v) = parse_var("DOCSCAN_APPLY_CLOSING")? {
            config.preprocess.apply_closing = v;
        }
        if let Some(v) = parse_var("DOCSCAN_THRESHOLD_BLOCK_SIZE")? {
            config.preprocess.threshold_block_size = v;
        }
        if let Some(v) = parse_var("DOCSCAN_THRESHOLD_OFFSET")? {
            config.preprocess.threshold_offset = v;
        }
        if let Some(v) = parse_var("DOCSCAN_MAX_DIMENSION")? {
            config.pipeline.max_dimension = v;
        }
        if let Ok(dir) = env::var("DOCSCAN_MODEL_DIR") {
            config.recognition.model_dir = Some(PathBuf::from(dir));
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let p = &self.preprocess;
        if p.threshold_block_size < 3 || p.threshold_block_size % 2 == 0 {
            anyhow::bail!(
                "threshold block size must be odd and at least 3, got {}",
                p.threshold_block_size
            );
        }
        if p.bilateral_diameter == 0 {
            anyhow::bail!("bilateral diameter must be positive");
        }
        if p.sigma_color <= 0.0 || p.sigma_space <= 0.0 {
            anyhow::bail!(
                "bilateral sigmas must be positive, got color={} space={}",
                p.sigma_color,
                p.sigma_space
            );
        }
        if p.closing_kernel == 0 || p.closing_kernel / 2 > u8::MAX as u32 {
            anyhow::bail!("closing kernel must be between 1 and 511, got {}", p.closing_kernel);
        }
        if self.pipeline.max_dimension == 0 {
            anyhow::bail!("max dimension must be positive");
        }
        if !self.quality.blur_threshold.is_finite() {
            anyhow::bail!("blur threshold must be finite");
        }
        Ok(())
    }
}

fn parse_var<T>(name: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| anyhow::anyhow!("Invalid value for {}: {:?} ({})", name, raw, e)),
        Err(_) => Ok(None),
    }
}
