use image::DynamicImage;
use imageproc::filter::laplacian_filter;
use tracing::{info, warn};

use crate::models::QualityReport;

/// Scores whether an image is sharp enough to OCR reliably
#[derive(Debug, Clone)]
pub struct QualityAssessor {
    pub blur_threshold: f64,
}

impl QualityAssessor {
    pub fn new(blur_threshold: f64) -> Self {
        Self { blur_threshold }
    }

    /// Advisory check; failures become an unacceptable report instead of an error
    pub fn assess(&self, img: &DynamicImage) -> QualityReport {
        match blur_metric(img) {
            Ok(metric) => {
                info!("Blur metric: {:.2}", metric);
                if metric < self.blur_threshold {
                    warn!("Image is below blur threshold {}", self.blur_threshold);
                    QualityReport {
                        acceptable: false,
                        message: QualityReport::BLURRY.to_string(),
                        metric,
                    }
                } else {
                    QualityReport {
                        acceptable: true,
                        message: QualityReport::ACCEPTABLE.to_string(),
                        metric,
                    }
                }
            }
            Err(e) => {
                warn!("Error checking image quality: {}", e);
                QualityReport {
                    acceptable: false,
                    message: format!("Error checking image quality: {}", e),
                    metric: 0.0,
                }
            }
        }
    }
}

impl Default for QualityAssessor {
    fn default() -> Self {
        Self::new(100.0)
    }
}

/// Variance of the Laplacian response over the luminance channel
pub fn blur_metric(img: &DynamicImage) -> Result<f64, String> {
    if img.width() == 0 || img.height() == 0 {
        return Err(format!("image has no pixels ({}x{})", img.width(), img.height()));
    }

    let gray = img.to_luma8();
    let response = laplacian_filter(&gray);

    let n = response.width() as f64 * response.height() as f64;
    let mean = response.pixels().map(|p| p[0] as f64).sum::<f64>() / n;
    let variance = response
        .pixels()
        .map(|p| {
            let d = p[0] as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / n;

    if variance.is_finite() {
        Ok(variance)
    } else {
        Err("blur metric is not finite".to_string())
    }
}
